/*!
 * Evaluation run, results file and charts
 */

use std::sync::Arc;

use thesisrag::bibliography::Bibliography;
use thesisrag::evaluation::{
    EvalItem, LlmJudgeScorer, Metric, QuestionStyle, generate_questions, load_eval_items,
    metric_means, read_results, run_evaluation, save_eval_items, write_charts, write_results,
};
use thesisrag::providers::mock::MockProvider;
use thesisrag::rag::{Chunker, Indexer, RagEngine, RetrievalSettings};
use thesisrag::store::VectorStore;

use crate::common::{self, SAMPLE_BIB, SAMPLE_MARKDOWN};

fn items() -> Vec<EvalItem> {
    vec![
        EvalItem {
            question: "Which source describes the retroflex fricative?".to_string(),
            ground_truth: "It is described by (Hamann, 2004).".to_string(),
        },
        EvalItem {
            question: "banana bread recipe".to_string(),
            ground_truth: "The thesis does not cover baking.".to_string(),
        },
    ]
}

async fn indexed_engine(dir: &std::path::Path) -> RagEngine {
    let db_path = dir.join("index.db");
    let store = VectorStore::create(&db_path).unwrap();
    Indexer::new(Arc::new(MockProvider::working()), Chunker::new(2000, 200).unwrap(), 8)
        .index(SAMPLE_MARKDOWN, &store)
        .await
        .unwrap();

    let llm = MockProvider::working()
        .with_custom_response(|_| "The retroflex fricative is described in [@hamann2004].".to_string());
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
async fn test_runEvaluation_withMockJudge_shouldScoreEveryQuestion() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut engine = indexed_engine(temp_dir.path()).await;
    let judge = MockProvider::working().with_custom_response(|_| "1 1 1 1 1 1".to_string());
    let scorer = LlmJudgeScorer::new(Arc::new(judge), Arc::new(MockProvider::working()));

    let records = run_evaluation(&mut engine, &scorer, &items()).await.unwrap();

    assert_eq!(records.len(), 2);

    let answered = &records[0];
    assert_eq!(answered.contexts.len(), 4);
    assert_eq!(answered.scores.faithfulness, Some(1.0));
    assert_eq!(answered.scores.context_precision, Some(1.0));
    assert_eq!(answered.scores.context_recall, Some(1.0));
    let relevancy = answered.scores.answer_relevancy.unwrap();
    assert!((0.0..=1.0).contains(&relevancy));

    let unanswered = &records[1];
    assert!(unanswered.contexts.is_empty());
    assert_eq!(unanswered.scores.faithfulness, None);
    assert_eq!(unanswered.scores.context_precision, Some(0.0));
    assert_eq!(unanswered.scores.context_recall, Some(0.0));

    let means = metric_means(&records);
    assert_eq!(means[0], (Metric::Faithfulness, Some(1.0)));
    assert_eq!(means[3], (Metric::ContextRecall, Some(0.5)));
}

#[tokio::test]
async fn test_runEvaluation_withFailingJudge_shouldLeaveScoresEmpty() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut engine = indexed_engine(temp_dir.path()).await;
    let scorer = LlmJudgeScorer::new(
        Arc::new(MockProvider::failing()),
        Arc::new(MockProvider::working()),
    );

    let records = run_evaluation(&mut engine, &scorer, &items()[..1]).await.unwrap();

    assert_eq!(records[0].scores.faithfulness, None);
    assert_eq!(records[0].scores.context_precision, None);
    assert!(records[0].scores.answer_relevancy.is_some());
}

#[tokio::test]
async fn test_evaluationArtifacts_shouldRoundTripAndRender() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::config_in(temp_dir.path());
    let mut engine = indexed_engine(temp_dir.path()).await;
    let judge = MockProvider::working().with_custom_response(|_| "0.75".to_string());
    let scorer = LlmJudgeScorer::new(Arc::new(judge), Arc::new(MockProvider::working()));

    let records = run_evaluation(&mut engine, &scorer, &items()).await.unwrap();
    let csv_path = config.paths.eval_results_path();
    write_results(&csv_path, &records).unwrap();

    let restored = read_results(&csv_path).unwrap();
    assert_eq!(restored, records);

    let charts = write_charts(&config.paths.img_dir, &restored).unwrap();
    let names: Vec<String> = charts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "ragas_boxplot.svg",
            "faithfulness.svg",
            "answer_relevancy.svg",
            "context_precision.svg",
            "context_recall.svg",
        ]
    );
}

#[tokio::test]
async fn test_generateQuestions_thenSave_shouldWriteLoadableSet() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::config_in(temp_dir.path());
    let llm = MockProvider::working().with_custom_response(|_| {
        "```json\n[\n  {\"question\": \"What is studied?\", \"ground_truth\": \"Polish sibilants.\"}\n]\n```"
            .to_string()
    });

    let items = generate_questions(&llm, SAMPLE_MARKDOWN, SAMPLE_BIB, QuestionStyle::Conceptual)
        .await
        .unwrap();
    let path = config.paths.generated_questions_path();
    save_eval_items(&path, &items).unwrap();

    let loaded = load_eval_items(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].ground_truth, "Polish sibilants.");
}
