/*!
 * LaTeX normalization and Markdown conversion.
 *
 * Input: `raw/modele.tex` and `raw/biblio.bib`.
 * Output:
 * - `intermediate/cleaned_ipa.tex` (also copied into `raw/` so pandoc can
 *   resolve the thesis' relative includes)
 * - `intermediate/main_with_noise.md`
 * - `final/biblio.bib`, byte-identical to the raw one
 */

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::pandoc::{ConversionRequest, DocumentConverter};
use crate::tipa::{Normalizer, normalize_latex};

/// Files written by [`prepare`]
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareOutputs {
    pub cleaned_latex: PathBuf,
    pub markdown: PathBuf,
    pub bibliography: PathBuf,
}

/// Normalize the LaTeX, convert it to Markdown and stage the bibliography
pub async fn prepare(config: &Config, converter: &dyn DocumentConverter) -> Result<PrepareOutputs> {
    let paths = &config.paths;
    FileManager::ensure_dir(&paths.intermediate_dir)?;
    FileManager::ensure_dir(&paths.final_dir)?;

    let latex_path = FileManager::require_file(paths.latex_path(), "the thesis export")?;
    let raw_bib = FileManager::require_file(paths.raw_bibliography_path(), "the thesis export")?;

    let source = FileManager::read_to_string(&latex_path)?;
    let normalizer = Normalizer::with_palatal_glide(config.normalization.palatal_glide);
    let cleaned = normalize_latex(&source, &normalizer);

    let cleaned_path = paths.cleaned_latex_path();
    FileManager::write_to_file(&cleaned_path, &cleaned)?;
    FileManager::copy_file(&cleaned_path, paths.raw_dir.join(&paths.cleaned_latex_file))?;
    info!("Normalized LaTeX written to {:?}", cleaned_path);

    let markdown_path = std::path::absolute(paths.noisy_markdown_path())
        .context("Failed to resolve the Markdown output path")?;
    let request = ConversionRequest {
        working_dir: paths.raw_dir.clone(),
        input_file: paths.cleaned_latex_file.clone(),
        bibliography: paths.bibliography_file.clone(),
        output: markdown_path.clone(),
    };
    converter
        .convert(&request)
        .await
        .context("LaTeX to Markdown conversion failed")?;

    let final_bib = paths.final_bibliography_path();
    FileManager::copy_file(&raw_bib, &final_bib)?;

    info!("Files generated:");
    info!("- cleaned LaTeX:   {:?}", cleaned_path);
    info!("- Markdown:        {:?}", markdown_path);
    info!("- Bibliography:    {:?}", final_bib);

    Ok(PrepareOutputs {
        cleaned_latex: cleaned_path,
        markdown: markdown_path,
        bibliography: final_bib,
    })
}
