/*!
 * On-disk vector store for thesis chunks.
 *
 * This module provides SQLite-based persistence for:
 * - Header-boosted chunks with their embeddings
 * - Index metadata (embedding model, corpus hash)
 *
 * The store is rebuilt from scratch on every index run.
 */

pub mod connection;
pub mod repository;
pub mod schema;

pub use connection::StoreConnection;
pub use repository::{ScoredChunk, StoredChunk, VectorStore, cosine_similarity, relevance_from_cosine};
