/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;
use thesisrag::app_config::{Config, LogLevel};

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.retrieval.chunk_size, 2000);
    assert_eq!(config.retrieval.chunk_overlap, 200);
    assert_eq!(config.retrieval.top_k, 4);
    assert_eq!(config.retrieval.relevance_threshold, 0.5);

    assert_eq!(config.providers.openai.chat_model, "gpt-4o-mini");
    assert_eq!(config.providers.openai.embedding_model, "text-embedding-3-small");
    assert_eq!(config.providers.anthropic.model, "claude-opus-4-5-20251101");
    assert_eq!(config.providers.anthropic.max_tokens, 20000);
    assert_eq!(config.providers.anthropic.temperature, 1.0);

    assert!(config.normalization.palatal_glide);
    assert_eq!(config.pandoc.binary, "pandoc");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_pathHelpers_withDefaultLayout_shouldMatchPipelineFiles() {
    let paths = Config::default().paths;

    assert_eq!(paths.latex_path(), PathBuf::from("data/raw/modele.tex"));
    assert_eq!(paths.raw_bibliography_path(), PathBuf::from("data/raw/biblio.bib"));
    assert_eq!(paths.cleaned_latex_path(), PathBuf::from("data/intermediate/cleaned_ipa.tex"));
    assert_eq!(paths.noisy_markdown_path(), PathBuf::from("data/intermediate/main_with_noise.md"));
    assert_eq!(
        paths.noise_inventory_path(),
        PathBuf::from("data/intermediate/corpus_noise_inventory.json")
    );
    assert_eq!(paths.markdown_path(), PathBuf::from("data/final/main.md"));
    assert_eq!(paths.final_bibliography_path(), PathBuf::from("data/final/biblio.bib"));
    assert_eq!(paths.generated_questions_path(), PathBuf::from("data/eval/eval_data_50.json"));
    assert_eq!(paths.eval_input_path(), PathBuf::from("data/eval/eval_data_final.json"));
    assert_eq!(
        paths.eval_results_path(),
        PathBuf::from("data/eval/ragas_evaluation_results_final.csv")
    );
    assert_eq!(paths.vector_store, PathBuf::from("vector_store/index.db"));
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.retrieval.top_k = 0;
    assert!(config.validate().is_err());
    config.retrieval.top_k = 4;

    config.retrieval.chunk_overlap = 2000;
    assert!(config.validate().is_err());
    config.retrieval.chunk_overlap = 200;

    config.retrieval.relevance_threshold = 1.5;
    assert!(config.validate().is_err());
    config.retrieval.relevance_threshold = 0.5;

    config.retrieval.chunk_size = 0;
    assert!(config.validate().is_err());
    config.retrieval.chunk_size = 2000;

    assert!(config.validate().is_ok());
}

#[test]
fn test_configSerialization_withRoundTrip_shouldPreserveValues() {
    let mut config = Config::default();
    config.retrieval.top_k = 6;
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"log_level\": \"debug\""));

    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.retrieval.top_k, 6);
    assert_eq!(parsed.log_level, LogLevel::Debug);
}

#[test]
fn test_configDeserialization_withEmptyObject_shouldUseDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.paths.markdown_file, "main.md");
    assert_eq!(config.evaluation.judge_model, "gpt-4o-mini");
    assert!(config.validate().is_ok());
}
