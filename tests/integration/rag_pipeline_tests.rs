/*!
 * Indexing and question answering over a temporary vector store
 */

use std::sync::Arc;

use thesisrag::bibliography::Bibliography;
use thesisrag::errors::StoreError;
use thesisrag::providers::mock::{MOCK_EMBEDDING_DIM, MockProvider};
use thesisrag::rag::prompts::NO_CONTEXT_ANSWER;
use thesisrag::rag::{Chunker, Indexer, RagEngine, RetrievalSettings};
use thesisrag::store::VectorStore;
use thesisrag::store::repository::{META_DIMENSION, META_EMBEDDING_MODEL};

use crate::common::{self, SAMPLE_BIB, SAMPLE_MARKDOWN};

fn indexer() -> Indexer {
    Indexer::new(
        Arc::new(MockProvider::working()),
        Chunker::new(2000, 200).unwrap(),
        4,
    )
}

fn engine(store: VectorStore, llm: MockProvider) -> RagEngine {
    RagEngine::new(
        store,
        Arc::new(MockProvider::working()),
        Arc::new(llm),
        Bibliography::parse(SAMPLE_BIB),
        RetrievalSettings {
            top_k: 4,
            relevance_threshold: 0.1,
        },
    )
}

#[tokio::test]
async fn test_index_withSampleThesis_shouldPersistChunksAndMetadata() {
    let temp_dir = common::create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("vector_store").join("index.db");

    let store = VectorStore::create(&db_path).unwrap();
    let report = indexer().index(SAMPLE_MARKDOWN, &store).await.unwrap();
    drop(store);

    assert_eq!(report.sections, 6);
    assert_eq!(report.chunks, 6);
    assert_eq!(report.dimension, MOCK_EMBEDDING_DIM);

    let reopened = VectorStore::open(&db_path).unwrap();
    assert_eq!(reopened.chunk_count().unwrap(), 6);
    assert_eq!(
        reopened.metadata(META_EMBEDDING_MODEL).unwrap().as_deref(),
        Some("mock-embedding")
    );
    assert_eq!(reopened.metadata(META_DIMENSION).unwrap().as_deref(), Some("64"));

    let chunks = reopened.all_chunks().unwrap();
    assert!(chunks[0].header_path.starts_with("Front Matter"));
    assert!(chunks.iter().any(|c| c.content.starts_with(
        "Headers: Introduction > Retroflex\nHeaders: Introduction > Retroflex\n\n"
    )));
}

#[tokio::test]
async fn test_index_runTwice_shouldRebuildFromScratch() {
    let temp_dir = common::create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("index.db");

    indexer()
        .index(SAMPLE_MARKDOWN, &VectorStore::create(&db_path).unwrap())
        .await
        .unwrap();
    let store = VectorStore::create(&db_path).unwrap();
    indexer().index(SAMPLE_MARKDOWN, &store).await.unwrap();

    assert_eq!(store.chunk_count().unwrap(), 6);
}

#[test]
fn test_open_withoutIndex_shouldReportNotIndexed() {
    let temp_dir = common::create_temp_dir().unwrap();
    let result = VectorStore::open(temp_dir.path().join("missing.db"));
    assert!(matches!(result, Err(StoreError::NotIndexed(_))));
}

#[tokio::test]
async fn test_answer_afterIndexing_shouldCiteAndListReferences() {
    let temp_dir = common::create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("index.db");
    indexer()
        .index(SAMPLE_MARKDOWN, &VectorStore::create(&db_path).unwrap())
        .await
        .unwrap();

    let llm = MockProvider::working()
        .with_custom_response(|_| "The retroflex fricative is described in [@hamann2004].".to_string());
    let mut engine = engine(VectorStore::open(&db_path).unwrap(), llm);

    let answer = engine
        .answer("Which source describes the retroflex fricative?")
        .await
        .unwrap();

    assert_eq!(answer.answer, "The retroflex fricative is described in (Hamann, 2004).");
    assert_eq!(answer.contexts.len(), 4);
    assert!(answer.contexts[0].contains("[@hamann2004]"));

    let references = engine.references(&answer.answer);
    assert_eq!(references.len(), 1);
    assert!(references[0].starts_with("Silke Hamann."));
}

#[tokio::test]
async fn test_answer_withUnrelatedQuestion_shouldNotCallModel() {
    let temp_dir = common::create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("index.db");
    indexer()
        .index(SAMPLE_MARKDOWN, &VectorStore::create(&db_path).unwrap())
        .await
        .unwrap();

    let llm = MockProvider::working();
    let mut engine = engine(VectorStore::open(&db_path).unwrap(), llm.clone());

    let answer = engine.answer("banana bread recipe").await.unwrap();

    assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
    assert!(answer.contexts.is_empty());
    assert_eq!(llm.request_count(), 0);
}
