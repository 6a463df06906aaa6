/*!
 * Question answering over the indexed thesis.
 */

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

use super::citations::{extract_used_sources, replace_citations_with_author_year};
use super::prompts::{NO_CONTEXT_ANSWER, build_answer_prompt, join_contexts};
use crate::bibliography::Bibliography;
use crate::providers::{CompletionProvider, EmbeddingProvider, TokenUsageStats};
use crate::store::VectorStore;
use crate::store::repository::META_EMBEDDING_MODEL;

/// Retrieval settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub relevance_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            relevance_threshold: 0.5,
        }
    }
}

/// An answer with the context it was generated from
#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswer {
    /// Answer with citations in author-year form
    pub answer: String,
    /// Retrieved chunks joined as they appeared in the prompt
    pub context_text: String,
    /// Retrieved chunks, best first
    pub contexts: Vec<String>,
}

impl RagAnswer {
    fn no_context() -> Self {
        Self {
            answer: NO_CONTEXT_ANSWER.to_string(),
            context_text: String::new(),
            contexts: Vec::new(),
        }
    }

    /// Whether retrieval found nothing relevant
    pub fn is_unanswered(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// Retrieval-augmented answering
pub struct RagEngine {
    store: VectorStore,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn CompletionProvider>,
    bibliography: Bibliography,
    settings: RetrievalSettings,
    usage: TokenUsageStats,
}

impl RagEngine {
    pub fn new(
        store: VectorStore,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn CompletionProvider>,
        bibliography: Bibliography,
        settings: RetrievalSettings,
    ) -> Self {
        match store.metadata(META_EMBEDDING_MODEL) {
            Ok(Some(model)) if model != embedder.model_name() => warn!(
                "Store was indexed with {} but queries use {}; re-run the index command",
                model,
                embedder.model_name()
            ),
            Err(e) => warn!("Could not read store metadata: {}", e),
            _ => {}
        }

        let usage = TokenUsageStats::with_provider_info("openai", llm.model_name());
        Self {
            store,
            embedder,
            llm,
            bibliography,
            settings,
            usage,
        }
    }

    pub fn bibliography(&self) -> &Bibliography {
        &self.bibliography
    }

    /// Token usage of the answer calls so far
    pub fn usage(&self) -> &TokenUsageStats {
        &self.usage
    }

    /// Chunks relevant to `question`, best first; empty when the best hit is
    /// below the relevance threshold
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let query = self
            .embedder
            .embed(question)
            .await
            .context("Failed to embed the question")?;
        let results = self
            .store
            .similarity_search_with_relevance_scores(&query, self.settings.top_k)?;

        match results.first() {
            None => {
                debug!("Similarity search returned no chunks");
                Ok(Vec::new())
            }
            Some(best) if best.score < self.settings.relevance_threshold => {
                debug!(
                    "Best relevance {:.3} is below threshold {:.3}",
                    best.score, self.settings.relevance_threshold
                );
                Ok(Vec::new())
            }
            Some(_) => Ok(results.into_iter().map(|hit| hit.chunk.content).collect()),
        }
    }

    /// Answer `question` from the thesis
    pub async fn answer(&mut self, question: &str) -> Result<RagAnswer> {
        let contexts = self.retrieve(question).await?;
        if contexts.is_empty() {
            info!("No relevant context for question: {}", question);
            return Ok(RagAnswer::no_context());
        }

        let context_text = join_contexts(&contexts);
        let prompt = build_answer_prompt(&context_text, question);

        let started = Instant::now();
        let completion = self
            .llm
            .complete(&prompt)
            .await
            .context("Failed to generate an answer")?;
        self.usage.record(&completion, started.elapsed());

        let raw_answer = completion.text.trim();
        debug!("Raw answer: {}", raw_answer);

        Ok(RagAnswer {
            answer: replace_citations_with_author_year(raw_answer, &self.bibliography),
            context_text,
            contexts,
        })
    }

    /// Plain-style references cited by `answer`
    pub fn references(&self, answer: &str) -> Vec<String> {
        extract_used_sources(answer, &self.bibliography)
    }
}

/// Console rendering: the answer, then the references each followed by a
/// blank line
pub fn render_answer(answer: &str, references: &[String]) -> String {
    let mut out = format!("Response:\n\n{}\n", answer);
    if !references.is_empty() {
        out.push_str("\nReferences:\n\n");
        for reference in references {
            out.push_str(reference);
            out.push_str("\n\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::chunker::Chunk;
    use crate::providers::mock::MockProvider;

    fn store_with(texts: &[&str]) -> VectorStore {
        let store = VectorStore::new_in_memory().unwrap();
        let chunks: Vec<Chunk> = texts
            .iter()
            .map(|t| Chunk {
                content: t.to_string(),
                header_path: "Headers: Test".to_string(),
                start_index: 0,
            })
            .collect();
        let embeddings: Vec<Vec<f32>> = texts.iter().map(|t| MockProvider::embed_text(t)).collect();
        store.insert_chunks(&chunks, &embeddings).unwrap();
        store
    }

    fn engine(store: VectorStore, llm: MockProvider) -> RagEngine {
        RagEngine::new(
            store,
            Arc::new(MockProvider::working()),
            Arc::new(llm),
            Bibliography::parse("@book{jassem2003, author = {Jassem, Wiktor}, title = {Polish}, year = {2003}}"),
            RetrievalSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_answer_withIrrelevantQuestion_shouldReturnFallback() {
        let mut engine = engine(store_with(&["retroflex sibilants in Polish"]), MockProvider::working());
        let answer = engine.answer("banana bread recipe").await.unwrap();

        assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
        assert!(answer.is_unanswered());
        assert_eq!(engine.usage().requests, 0);
    }

    /// Embeds every query as the x axis
    #[derive(Debug)]
    struct AxisEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, crate::errors::ProviderError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn model_name(&self) -> &str {
            "axis"
        }
    }

    fn axis_engine(chunk_embedding: Vec<f32>) -> RagEngine {
        let store = VectorStore::new_in_memory().unwrap();
        let chunk = Chunk {
            content: "tilted chunk".to_string(),
            header_path: "Headers: Test".to_string(),
            start_index: 0,
        };
        store.insert_chunks(&[chunk], &[chunk_embedding]).unwrap();
        RagEngine::new(
            store,
            Arc::new(AxisEmbedder),
            Arc::new(MockProvider::working()),
            Bibliography::parse(""),
            RetrievalSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_retrieve_atCosineSixTenths_shouldRejectChunk() {
        let engine = axis_engine(vec![0.6, 0.8]);
        assert!(engine.retrieve("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_atCosineSevenTenths_shouldKeepChunk() {
        let engine = axis_engine(vec![0.7, (1.0f32 - 0.49).sqrt()]);
        assert_eq!(engine.retrieve("anything").await.unwrap(), vec!["tilted chunk".to_string()]);
    }

    #[tokio::test]
    async fn test_answer_withEmptyStore_shouldReturnFallback() {
        let mut engine = engine(VectorStore::new_in_memory().unwrap(), MockProvider::working());
        let answer = engine.answer("retroflex sibilants").await.unwrap();
        assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
    }

    #[tokio::test]
    async fn test_answer_shouldRewriteCitations() {
        let llm = MockProvider::working().with_custom_response(|_| "Polish has retroflexes [@jassem2003].".to_string());
        let mut engine = engine(store_with(&["retroflex sibilants in Polish", "unrelated"]), llm);

        let answer = engine.answer("retroflex sibilants in Polish").await.unwrap();
        assert_eq!(answer.answer, "Polish has retroflexes (Jassem, 2003).");
        assert_eq!(answer.contexts[0], "retroflex sibilants in Polish");
        assert_eq!(answer.context_text, answer.contexts.join("\n---\n"));
        assert_eq!(engine.references(&answer.answer).len(), 1);
        assert_eq!(engine.usage().requests, 1);
    }

    #[tokio::test]
    async fn test_answer_withFailingLlm_shouldPropagate() {
        let mut engine = engine(store_with(&["retroflex sibilants"]), MockProvider::failing());
        assert!(engine.answer("retroflex sibilants").await.is_err());
    }

    #[test]
    fn test_renderAnswer_shouldListReferencesWithBlankLines() {
        assert_eq!(render_answer("Yes.", &[]), "Response:\n\nYes.\n");
        assert_eq!(
            render_answer("Yes.", &["A. Ref.".to_string()]),
            "Response:\n\nYes.\n\nReferences:\n\nA. Ref.\n\n"
        );
    }
}
