/*!
 * Index construction: sections, chunks, embeddings, store.
 */

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::Arc;

use super::chunker::{Chunk, Chunker};
use super::markdown::structure_document;
use crate::file_utils::FileManager;
use crate::progress::progress_bar;
use crate::providers::EmbeddingProvider;
use crate::store::VectorStore;
use crate::store::repository::{META_CORPUS_SHA256, META_DIMENSION, META_EMBEDDING_MODEL};

/// What an index run produced
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub sections: usize,
    pub chunks: usize,
    pub dimension: usize,
}

/// Embeds chunks batch by batch and writes them to a store
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Chunker,
    batch_size: usize,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, chunker: Chunker, batch_size: usize) -> Self {
        Self {
            embedder,
            chunker,
            batch_size: batch_size.max(1),
        }
    }

    /// Split the Markdown into header-boosted chunks, title page first
    pub fn prepare_chunks(&self, markdown: &str) -> (usize, Vec<Chunk>) {
        let sections = structure_document(markdown);
        let chunks = self.chunker.chunk_sections(&sections);
        debug!("{} sections produced {} chunks", sections.len(), chunks.len());
        (sections.len(), chunks)
    }

    /// Index `markdown` into `store`
    pub async fn index(&self, markdown: &str, store: &VectorStore) -> Result<IndexReport> {
        let (sections, chunks) = self.prepare_chunks(markdown);
        if chunks.is_empty() {
            warn!("The corpus produced no chunks; the store will be empty");
        }

        let progress = progress_bar(chunks.len(), "chunks");
        progress.set_message("Embedding");

        let mut dimension = 0;
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self
                .embedder
                .embed_batch(&texts)
                .await
                .with_context(|| format!("Failed to embed {} chunks", texts.len()))?;

            if let Some(first) = embeddings.first() {
                dimension = first.len();
            }
            store
                .insert_chunks(batch, &embeddings)
                .context("Failed to write chunks to the vector store")?;
            progress.inc(batch.len() as u64);
        }
        progress.finish_with_message("Embedded");

        store.set_metadata(META_EMBEDDING_MODEL, self.embedder.model_name())?;
        store.set_metadata(META_CORPUS_SHA256, &FileManager::sha256_of(markdown.as_bytes()))?;
        store.set_metadata(META_DIMENSION, &dimension.to_string())?;

        info!(
            "Saved {} chunks from {} sections to {:?}",
            chunks.len(),
            sections,
            store.path()
        );

        Ok(IndexReport {
            sections,
            chunks: chunks.len(),
            dimension,
        })
    }
}
