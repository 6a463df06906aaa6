/*!
 * LaTeX to Markdown conversion through the pandoc binary.
 *
 * The converter is a trait so the prepare pipeline can be exercised without
 * pandoc installed; [`PandocConverter`] is the real implementation and runs
 * pandoc as a subprocess with a timeout.
 */

use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::ConversionError;

/// One LaTeX to Markdown conversion
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Directory the converter runs in (LaTeX includes resolve from here)
    pub working_dir: PathBuf,
    /// LaTeX file name, relative to `working_dir`
    pub input_file: String,
    /// Bibliography file name, relative to `working_dir`
    pub bibliography: String,
    /// Markdown output path
    pub output: PathBuf,
}

/// Something that turns LaTeX into Markdown
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Run the conversion described by `request`
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConversionError>;
}

/// Runs the `pandoc` binary
#[derive(Debug, Clone)]
pub struct PandocConverter {
    binary: String,
    timeout: Duration,
}

impl PandocConverter {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Command-line arguments for a request
    pub fn build_args(request: &ConversionRequest) -> Vec<String> {
        vec![
            request.input_file.clone(),
            "--from=latex".to_string(),
            "--to=markdown".to_string(),
            "--output".to_string(),
            request.output.to_string_lossy().to_string(),
            "--citeproc".to_string(),
            format!("--bibliography={}", request.bibliography),
            "--standalone".to_string(),
            "--wrap=none".to_string(),
            "--top-level-division=chapter".to_string(),
        ]
    }

    /// Keep the lines of pandoc's stderr that explain a failure
    fn filter_pandoc_stderr(stderr: &str) -> String {
        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("[WARNING]"))
            .collect();

        if meaningful.is_empty() {
            stderr.trim().to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConversionError> {
        let args = Self::build_args(request);
        info!("Running {} in folder: {:?}", self.binary, request.working_dir);
        debug!("{} {}", self.binary, args.join(" "));

        let pandoc_future = Command::new(&self.binary)
            .args(&args)
            .current_dir(&request.working_dir)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = pandoc_future => {
                result.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => ConversionError::BinaryNotFound(self.binary.clone()),
                    _ => ConversionError::Io(e),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ConversionError::TimedOut(self.timeout.as_secs()));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ConversionError::Failed {
                code: output.status.code(),
                stderr: Self::filter_pandoc_stderr(&stderr),
            });
        }

        let warnings = stderr.lines().filter(|l| l.starts_with("[WARNING]")).count();
        if warnings > 0 {
            warn!("pandoc reported {} warnings", warnings);
        }

        Ok(())
    }
}
