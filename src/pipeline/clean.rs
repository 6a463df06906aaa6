/*!
 * Conversion noise removal.
 *
 * Reads `intermediate/main_with_noise.md`, records every noise match in
 * `intermediate/corpus_noise_inventory.json` and writes the cleaned corpus
 * to `final/main.md`. Removal works from the saved inventory, so an edited
 * inventory file controls what is stripped on the next run.
 */

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::noise::{NoiseCategory, NoiseFilter, NoiseInventory};

/// What [`clean`] wrote
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutputs {
    pub inventory: PathBuf,
    pub markdown: PathBuf,
    pub removed: usize,
}

/// Extract the noise inventory, save it, and remove it from the corpus
pub fn clean(config: &Config) -> Result<CleanOutputs> {
    let paths = &config.paths;
    let source = FileManager::require_file(paths.noisy_markdown_path(), "thesisrag prepare")?;
    let corpus = FileManager::read_to_string(&source)?;

    let inventory = NoiseFilter::extract(&corpus);
    for category in NoiseCategory::ALL {
        info!("{}: {} distinct matches", category, inventory.get(category).len());
    }

    let inventory_path = paths.noise_inventory_path();
    FileManager::write_json(&inventory_path, &inventory)?;
    info!("Saved corpus noise inventory to: {:?}", inventory_path);

    let saved: NoiseInventory = FileManager::read_json(&inventory_path)?;
    let cleaned = NoiseFilter::remove(&corpus, &saved);

    let markdown_path = paths.markdown_path();
    FileManager::write_to_file(&markdown_path, &cleaned)?;
    info!("Saved cleaned corpus to: {:?}", markdown_path);

    Ok(CleanOutputs {
        inventory: inventory_path,
        markdown: markdown_path,
        removed: saved.total(),
    })
}
