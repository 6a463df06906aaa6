/*!
 * Common test utilities for the thesisrag test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use thesisrag::Config;
use thesisrag::errors::ConversionError;
use thesisrag::pandoc::{ConversionRequest, DocumentConverter};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Configuration with every path under `root`
pub fn config_in(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.raw_dir = root.join("data/raw");
    config.paths.intermediate_dir = root.join("data/intermediate");
    config.paths.final_dir = root.join("data/final");
    config.paths.eval_dir = root.join("data/eval");
    config.paths.img_dir = root.join("img");
    config.paths.vector_store = root.join("vector_store/index.db");
    config
}

pub const SAMPLE_LATEX: &str = r#"\documentclass{article}
\begin{document}
\section{Palatals}
The fricative \textipa{[\textctc a]} contrasts with \textipa{[S a]}.
Aspiration appears in \textipa{[p\super h a]}.
\end{document}
"#;

pub const SAMPLE_BIB: &str = r#"@book{hamann2004,
  author = {Hamann, Silke},
  title = {Retroflex Fricatives in Slavic Languages},
  publisher = {Blackwell},
  year = {2004}
}

@article{jassem2003,
  author = {Jassem, Wiktor and Nowak, Anna},
  title = {Polish},
  journal = {Journal of the IPA},
  volume = {33},
  pages = {103--107},
  year = {2003}
}
"#;

pub const SAMPLE_MARKDOWN: &str = r#"---
title: Sibilants in Polish
author: A. Student
---

## Abstract

This thesis describes Polish sibilants.

# Introduction

Polish has three series of sibilants: dental, retroflex and alveolo-palatal.

## Retroflex

The retroflex fricative ʂ is described by [@hamann2004].

# Method

Recordings of twenty speakers were analysed with Praat.
"#;

/// Converter that writes canned Markdown instead of running pandoc
#[derive(Debug, Clone)]
pub struct FakeConverter {
    markdown: String,
    pub requests: Arc<Mutex<Vec<ConversionRequest>>>,
}

impl FakeConverter {
    pub fn new(markdown: &str) -> Self {
        Self {
            markdown: markdown.to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConversionError> {
        let input = request.working_dir.join(&request.input_file);
        if !input.is_file() {
            return Err(ConversionError::Failed {
                code: Some(1),
                stderr: format!("missing input {:?}", input),
            });
        }
        fs::write(&request.output, &self.markdown)?;
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}
