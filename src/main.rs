// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use thesisrag::app_config::{self, Config};
use thesisrag::evaluation::QuestionStyle;
use thesisrag::file_utils::FileManager;
use thesisrag::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize TIPA in the LaTeX source and convert it to Markdown
    Prepare,

    /// Remove conversion noise from the Markdown
    Clean,

    /// Chunk and embed the cleaned Markdown into the vector store
    Index,

    /// Answer one question about the thesis
    Ask {
        /// The question
        #[arg(value_name = "QUESTION")]
        question: String,
    },

    /// Ask questions interactively
    Chat,

    /// Generate a synthetic evaluation set
    GenerateQuestions {
        /// Ask for about 15 big-picture questions instead of about 50
        #[arg(long)]
        conceptual: bool,
    },

    /// Answer and score an evaluation set
    Evaluate {
        /// Question set to evaluate (defaults to paths.eval_input_file)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Render charts from the evaluation results
    Plot {
        /// Results CSV (defaults to paths.eval_results_file)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Generate shell completions for thesisrag
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// thesisrag - question answering over a LaTeX thesis
#[derive(Parser, Debug)]
#[command(name = "thesisrag")]
#[command(version)]
#[command(about = "Question answering over a phonetics thesis written in LaTeX")]
#[command(long_about = "thesisrag turns a LaTeX thesis into a searchable corpus and answers questions about it.

PIPELINE:
    thesisrag prepare                       # TIPA -> IPA, LaTeX -> Markdown
    thesisrag clean                         # Strip conversion noise
    thesisrag index                         # Build the vector store
    thesisrag ask \"What is palatalization?\" # One question
    thesisrag chat                          # Interactive questions
    thesisrag generate-questions            # Synthetic evaluation set
    thesisrag evaluate                      # Score answers
    thesisrag plot                          # SVG charts of the scores
    thesisrag completions bash > thesisrag.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

ENVIRONMENT:
    OPENAI_API_KEY     embeddings, answers and evaluation judgements
    ANTHROPIC_API_KEY  question generation")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✖",
            Level::Warn => "!",
            Level::Info => "·",
            Level::Debug => "?",
            Level::Trace => "»",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = match record.level() {
                Level::Error => "1;31",
                Level::Warn => "1;33",
                Level::Info => "1;32",
                Level::Debug => "1;36",
                Level::Trace => "1;35",
            };
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                Self::get_marker_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Load the configuration, writing the defaults when the file is missing
fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        FileManager::read_json(config_path)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        FileManager::write_json(config_path, &config)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(log_level) = log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "thesisrag", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }
    let config = load_config(&cli.config, cli.log_level.as_ref())?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Prepare => {
            controller.prepare().await?;
        }
        Commands::Clean => {
            controller.clean()?;
        }
        Commands::Index => {
            controller.index().await?;
        }
        Commands::Ask { question } => {
            controller.ask(&question).await?;
        }
        Commands::Chat => controller.chat().await?,
        Commands::GenerateQuestions { conceptual } => {
            let style = if conceptual {
                QuestionStyle::Conceptual
            } else {
                QuestionStyle::Detailed
            };
            controller.generate_questions(style).await?;
        }
        Commands::Evaluate { input } => {
            controller.evaluate(input.as_deref()).await?;
        }
        Commands::Plot { input } => {
            controller.plot(input.as_deref())?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
