use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Input, intermediate and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Hosted API settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Chunking and retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// LaTeX normalization settings
    #[serde(default)]
    pub normalization: NormalizationConfig,

    /// External converter settings
    #[serde(default)]
    pub pandoc: PandocConfig,

    /// Evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// File layout of the data pipeline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    // @field: Directory holding the LaTeX source and bibliography
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    // @field: Directory for intermediate artifacts
    #[serde(default = "default_intermediate_dir")]
    pub intermediate_dir: PathBuf,

    // @field: Directory for the cleaned corpus
    #[serde(default = "default_final_dir")]
    pub final_dir: PathBuf,

    // @field: Directory for evaluation data and results
    #[serde(default = "default_eval_dir")]
    pub eval_dir: PathBuf,

    // @field: Directory for rendered charts
    #[serde(default = "default_img_dir")]
    pub img_dir: PathBuf,

    // @field: SQLite vector store file
    #[serde(default = "default_vector_store")]
    pub vector_store: PathBuf,

    // @field: LaTeX source file name in raw_dir
    #[serde(default = "default_latex_file")]
    pub latex_file: String,

    // @field: Bibliography file name in raw_dir
    #[serde(default = "default_bibliography_file")]
    pub bibliography_file: String,

    // @field: Normalized LaTeX file name
    #[serde(default = "default_cleaned_latex_file")]
    pub cleaned_latex_file: String,

    // @field: Raw pandoc output file name
    #[serde(default = "default_noisy_markdown_file")]
    pub noisy_markdown_file: String,

    // @field: Noise inventory file name
    #[serde(default = "default_noise_inventory_file")]
    pub noise_inventory_file: String,

    // @field: Cleaned Markdown file name in final_dir
    #[serde(default = "default_markdown_file")]
    pub markdown_file: String,

    // @field: Generated question set file name in eval_dir
    #[serde(default = "default_generated_questions_file")]
    pub generated_questions_file: String,

    // @field: Question set read by the evaluate command
    #[serde(default = "default_eval_input_file")]
    pub eval_input_file: String,

    // @field: Evaluation results CSV file name in eval_dir
    #[serde(default = "default_eval_results_file")]
    pub eval_results_file: String,
}

impl PathsConfig {
    pub fn latex_path(&self) -> PathBuf {
        self.raw_dir.join(&self.latex_file)
    }

    pub fn raw_bibliography_path(&self) -> PathBuf {
        self.raw_dir.join(&self.bibliography_file)
    }

    pub fn final_bibliography_path(&self) -> PathBuf {
        self.final_dir.join(&self.bibliography_file)
    }

    pub fn cleaned_latex_path(&self) -> PathBuf {
        self.intermediate_dir.join(&self.cleaned_latex_file)
    }

    pub fn noisy_markdown_path(&self) -> PathBuf {
        self.intermediate_dir.join(&self.noisy_markdown_file)
    }

    pub fn noise_inventory_path(&self) -> PathBuf {
        self.intermediate_dir.join(&self.noise_inventory_file)
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.final_dir.join(&self.markdown_file)
    }

    pub fn generated_questions_path(&self) -> PathBuf {
        self.eval_dir.join(&self.generated_questions_file)
    }

    pub fn eval_input_path(&self) -> PathBuf {
        self.eval_dir.join(&self.eval_input_file)
    }

    pub fn eval_results_path(&self) -> PathBuf {
        self.eval_dir.join(&self.eval_results_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            intermediate_dir: default_intermediate_dir(),
            final_dir: default_final_dir(),
            eval_dir: default_eval_dir(),
            img_dir: default_img_dir(),
            vector_store: default_vector_store(),
            latex_file: default_latex_file(),
            bibliography_file: default_bibliography_file(),
            cleaned_latex_file: default_cleaned_latex_file(),
            noisy_markdown_file: default_noisy_markdown_file(),
            noise_inventory_file: default_noise_inventory_file(),
            markdown_file: default_markdown_file(),
            generated_questions_file: default_generated_questions_file(),
            eval_input_file: default_eval_input_file(),
            eval_results_file: default_eval_results_file(),
        }
    }
}

/// Hosted providers
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProvidersConfig {
    /// Embeddings, answers and evaluation judgements
    #[serde(default)]
    pub openai: OpenAIConfig,

    /// Synthetic question generation
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

/// OpenAI service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIConfig {
    /// API key; falls back to OPENAI_API_KEY when empty
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Model answering questions
    #[serde(default = "default_openai_chat_model")]
    pub chat_model: String,

    /// Model embedding chunks and questions
    #[serde(default = "default_openai_embedding_model")]
    pub embedding_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            chat_model: default_openai_chat_model(),
            embedding_model: default_openai_embedding_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Anthropic service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnthropicConfig {
    /// API key; falls back to ANTHROPIC_API_KEY when empty
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_anthropic_endpoint")]
    pub endpoint: String,

    /// Model generating evaluation questions
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    /// Maximum tokens in the generated answer
    #[serde(default = "default_anthropic_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0 to 1.0)
    #[serde(default = "default_anthropic_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds; question generation over the whole
    /// thesis is slow
    #[serde(default = "default_anthropic_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_anthropic_endpoint(),
            model: default_anthropic_model(),
            max_tokens: default_anthropic_max_tokens(),
            temperature: default_anthropic_temperature(),
            timeout_secs: default_anthropic_timeout_secs(),
        }
    }
}

/// Chunking and retrieval settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum relevance of the best chunk for an answer to be attempted
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,

    /// Chunks per embeddings request
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            embedding_batch_size: default_embedding_batch_size(),
        }
    }
}

/// LaTeX normalization settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NormalizationConfig {
    /// Rewrite `i` before a vowel as `j` inside TIPA blocks
    #[serde(default = "default_true")]
    pub palatal_glide: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            palatal_glide: true,
        }
    }
}

/// External converter settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PandocConfig {
    /// Binary name or path
    #[serde(default = "default_pandoc_binary")]
    pub binary: String,

    /// Conversion timeout in seconds
    #[serde(default = "default_pandoc_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PandocConfig {
    fn default() -> Self {
        Self {
            binary: default_pandoc_binary(),
            timeout_secs: default_pandoc_timeout_secs(),
        }
    }
}

/// Evaluation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvaluationConfig {
    /// Model used as the judge for LLM-scored metrics
    #[serde(default = "default_openai_chat_model")]
    pub judge_model: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            judge_model: default_openai_chat_model(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_intermediate_dir() -> PathBuf {
    PathBuf::from("data/intermediate")
}

fn default_final_dir() -> PathBuf {
    PathBuf::from("data/final")
}

fn default_eval_dir() -> PathBuf {
    PathBuf::from("data/eval")
}

fn default_img_dir() -> PathBuf {
    PathBuf::from("img")
}

fn default_vector_store() -> PathBuf {
    PathBuf::from("vector_store/index.db")
}

fn default_latex_file() -> String {
    "modele.tex".to_string()
}

fn default_bibliography_file() -> String {
    "biblio.bib".to_string()
}

fn default_cleaned_latex_file() -> String {
    "cleaned_ipa.tex".to_string()
}

fn default_noisy_markdown_file() -> String {
    "main_with_noise.md".to_string()
}

fn default_noise_inventory_file() -> String {
    "corpus_noise_inventory.json".to_string()
}

fn default_markdown_file() -> String {
    "main.md".to_string()
}

fn default_generated_questions_file() -> String {
    "eval_data_50.json".to_string()
}

fn default_eval_input_file() -> String {
    "eval_data_final.json".to_string()
}

fn default_eval_results_file() -> String {
    "ragas_evaluation_results_final.csv".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_anthropic_model() -> String {
    "claude-opus-4-5-20251101".to_string()
}

fn default_anthropic_max_tokens() -> u32 {
    20000
}

fn default_anthropic_temperature() -> f32 {
    1.0
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_anthropic_timeout_secs() -> u64 {
    600
}

fn default_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

fn default_relevance_threshold() -> f32 {
    0.5
}

fn default_embedding_batch_size() -> usize {
    64
}

fn default_pandoc_binary() -> String {
    "pandoc".to_string()
}

fn default_pandoc_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let retrieval = &self.retrieval;
        if retrieval.chunk_size == 0 {
            return Err(anyhow!("retrieval.chunk_size must be greater than 0"));
        }
        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(anyhow!(
                "retrieval.chunk_overlap ({}) must be smaller than retrieval.chunk_size ({})",
                retrieval.chunk_overlap,
                retrieval.chunk_size
            ));
        }
        if retrieval.top_k == 0 {
            return Err(anyhow!("retrieval.top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&retrieval.relevance_threshold) {
            return Err(anyhow!(
                "retrieval.relevance_threshold must be between 0 and 1, got {}",
                retrieval.relevance_threshold
            ));
        }
        if retrieval.embedding_batch_size == 0 {
            return Err(anyhow!("retrieval.embedding_batch_size must be at least 1"));
        }

        let anthropic = &self.providers.anthropic;
        if anthropic.max_tokens == 0 {
            return Err(anyhow!("providers.anthropic.max_tokens must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&anthropic.temperature) {
            return Err(anyhow!(
                "providers.anthropic.temperature must be between 0 and 1, got {}",
                anthropic.temperature
            ));
        }

        for (name, endpoint) in [
            ("providers.openai.endpoint", &self.providers.openai.endpoint),
            ("providers.anthropic.endpoint", &anthropic.endpoint),
        ] {
            Url::parse(endpoint).map_err(|e| anyhow!("{} is not a valid URL ({}): {}", name, endpoint, e))?;
        }

        if self.pandoc.binary.trim().is_empty() {
            return Err(anyhow!("pandoc.binary must not be empty"));
        }

        Ok(())
    }
}
