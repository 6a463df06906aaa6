use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::bibliography::Bibliography;
use crate::credentials::{ANTHROPIC_API_KEY_VAR, OPENAI_API_KEY_VAR, resolve_api_key};
use crate::evaluation::{
    self, LlmJudgeScorer, QuestionStyle, load_eval_items, read_results, run_evaluation,
    save_eval_items, write_charts, write_results,
};
use crate::file_utils::FileManager;
use crate::pandoc::PandocConverter;
use crate::pipeline::{self, CleanOutputs, PrepareOutputs};
use crate::providers::anthropic::Anthropic;
use crate::providers::openai::OpenAI;
use crate::rag::{Chunker, IndexReport, Indexer, RagEngine, RetrievalSettings, render_answer};
use crate::store::VectorStore;

// @module: Application controller for the thesis pipeline

/// Main application controller: one method per command
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalize the LaTeX and convert it to Markdown with pandoc
    pub async fn prepare(&self) -> Result<PrepareOutputs> {
        let converter = PandocConverter::new(&self.config.pandoc.binary, self.config.pandoc.timeout_secs);
        let outputs = pipeline::prepare(&self.config, &converter).await?;
        info!("Success: {:?}", outputs.markdown);
        Ok(outputs)
    }

    /// Strip conversion noise from the Markdown
    pub fn clean(&self) -> Result<CleanOutputs> {
        let outputs = pipeline::clean(&self.config)?;
        info!("Removed {} distinct noise strings", outputs.removed);
        Ok(outputs)
    }

    /// Chunk and embed the cleaned Markdown into a fresh vector store
    pub async fn index(&self) -> Result<IndexReport> {
        let paths = &self.config.paths;
        let markdown_path = FileManager::require_file(paths.markdown_path(), "thesisrag clean")?;
        let markdown = FileManager::read_to_string(&markdown_path)?;

        let openai = Arc::new(self.openai_client()?);
        let retrieval = &self.config.retrieval;
        let chunker = Chunker::new(retrieval.chunk_size, retrieval.chunk_overlap)?;
        let indexer = Indexer::new(openai, chunker, retrieval.embedding_batch_size);

        let store = VectorStore::create(&paths.vector_store)
            .with_context(|| format!("Failed to create vector store at {:?}", paths.vector_store))?;
        let report = indexer.index(&markdown, &store).await?;
        info!(
            "Indexed {} chunks from {} sections into {:?}",
            report.chunks, report.sections, paths.vector_store
        );
        Ok(report)
    }

    /// Answer one question and print it with its references
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut engine = self.rag_engine()?;
        let rendered = Self::answer_and_render(&mut engine, question).await?;
        print!("{}", rendered);
        info!("{}", engine.usage().summary());
        Ok(rendered)
    }

    /// Interactive question loop on stdin; ends on EOF, `exit` or `quit`
    pub async fn chat(&self) -> Result<()> {
        let mut engine = self.rag_engine()?;
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        println!("Ask a question about the thesis (type 'exit' to quit).");
        loop {
            print!("> ");
            stdout.flush().context("Failed to flush stdout")?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line).context("Failed to read from stdin")? == 0 {
                break;
            }
            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
                break;
            }

            match Self::answer_and_render(&mut engine, question).await {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => warn!("Failed to answer: {:#}", e),
            }
        }

        info!("{}", engine.usage().summary());
        Ok(())
    }

    /// Ask the question model for an evaluation set and save it
    pub async fn generate_questions(&self, style: QuestionStyle) -> Result<PathBuf> {
        let paths = &self.config.paths;
        let thesis = FileManager::read_to_string(FileManager::require_file(
            paths.markdown_path(),
            "thesisrag clean",
        )?)?;
        let bibliography = FileManager::read_to_string(FileManager::require_file(
            paths.final_bibliography_path(),
            "thesisrag prepare",
        )?)?;

        let settings = &self.config.providers.anthropic;
        let api_key = resolve_api_key(&settings.api_key, ANTHROPIC_API_KEY_VAR, "Anthropic")?;
        let client = Anthropic::new(
            api_key,
            &settings.endpoint,
            &settings.model,
            settings.max_tokens,
            settings.temperature,
            settings.timeout_secs,
        );

        let items = evaluation::generate_questions(&client, &thesis, &bibliography, style).await?;
        let output = paths.generated_questions_path();
        save_eval_items(&output, &items)?;
        info!("Saved {} questions to {:?}", items.len(), output);
        Ok(output)
    }

    /// Answer and score an evaluation set, writing the results CSV
    pub async fn evaluate(&self, input: Option<&Path>) -> Result<PathBuf> {
        let input = match input {
            Some(path) => path.to_path_buf(),
            None => self.config.paths.eval_input_path(),
        };
        let input = FileManager::require_file(&input, "thesisrag generate-questions")?;
        let items = load_eval_items(&input)?;
        info!("Loaded {} evaluation questions from {:?}", items.len(), input);

        let openai = self.openai_client()?;
        let judge = openai
            .with_chat_model(&self.config.evaluation.judge_model)
            .with_temperature(0.0);
        let scorer = LlmJudgeScorer::new(Arc::new(judge), Arc::new(openai.clone()));

        let mut engine = self.rag_engine_with(openai)?;
        let records = run_evaluation(&mut engine, &scorer, &items).await?;

        let output = self.config.paths.eval_results_path();
        write_results(&output, &records)?;
        info!("Saved evaluation results to {:?}", output);
        Ok(output)
    }

    /// Render charts from the results CSV
    pub fn plot(&self, input: Option<&Path>) -> Result<Vec<PathBuf>> {
        let input = match input {
            Some(path) => path.to_path_buf(),
            None => self.config.paths.eval_results_path(),
        };
        let input = FileManager::require_file(&input, "thesisrag evaluate")?;
        let records = read_results(&input)?;
        write_charts(&self.config.paths.img_dir, &records)
    }

    fn openai_client(&self) -> Result<OpenAI> {
        let settings = &self.config.providers.openai;
        let api_key = resolve_api_key(&settings.api_key, OPENAI_API_KEY_VAR, "OpenAI")?;
        Ok(OpenAI::new(
            api_key,
            &settings.endpoint,
            &settings.chat_model,
            &settings.embedding_model,
            settings.timeout_secs,
        ))
    }

    fn rag_engine(&self) -> Result<RagEngine> {
        self.rag_engine_with(self.openai_client()?)
    }

    fn rag_engine_with(&self, openai: OpenAI) -> Result<RagEngine> {
        let paths = &self.config.paths;
        let store = VectorStore::open(&paths.vector_store)
            .with_context(|| format!("Failed to open vector store at {:?}", paths.vector_store))?;
        let bibliography = Bibliography::load(FileManager::require_file(
            paths.final_bibliography_path(),
            "thesisrag prepare",
        )?)?;

        let openai = Arc::new(openai);
        let settings = RetrievalSettings {
            top_k: self.config.retrieval.top_k,
            relevance_threshold: self.config.retrieval.relevance_threshold,
        };
        Ok(RagEngine::new(store, openai.clone(), openai, bibliography, settings))
    }

    async fn answer_and_render(engine: &mut RagEngine, question: &str) -> Result<String> {
        let answer = engine.answer(question).await?;
        let references = engine.references(&answer.answer);
        Ok(render_answer(&answer.answer, &references))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withConfig_withInvalidConfig_shouldFail() {
        let mut config = Config::default();
        config.retrieval.chunk_overlap = config.retrieval.chunk_size;
        assert!(Controller::with_config(config).is_err());
    }

    #[test]
    fn test_plot_withMissingResults_shouldNameProducingCommand() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.eval_dir = dir.path().join("eval");
        let controller = Controller::with_config(config).unwrap();

        let err = controller.plot(None).unwrap_err();
        assert!(format!("{:#}", err).contains("thesisrag evaluate"));
    }
}
