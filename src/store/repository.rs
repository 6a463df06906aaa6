/*!
 * Chunk persistence and similarity search.
 *
 * Embeddings are stored as little-endian `f32` blobs next to their chunk.
 * Search is a full scan with cosine similarity, which is plenty for the
 * few hundred chunks of one thesis.
 */

use chrono::Utc;
use log::debug;
use rusqlite::{OptionalExtension, params};
use std::cmp::Ordering;
use std::path::Path;
use uuid::Uuid;

use super::connection::StoreConnection;
use crate::errors::StoreError;
use crate::rag::chunker::Chunk;

/// Metadata key for the embedding model name
pub const META_EMBEDDING_MODEL: &str = "embedding_model";
/// Metadata key for the SHA-256 of the indexed Markdown
pub const META_CORPUS_SHA256: &str = "corpus_sha256";
/// Metadata key for the embedding dimension
pub const META_DIMENSION: &str = "embedding_dimension";

/// A chunk read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredChunk {
    pub id: String,
    pub position: usize,
    pub content: String,
    pub header_path: String,
    pub start_index: usize,
    pub embedding: Vec<f32>,
}

/// A search hit with its relevance score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    pub score: f32,
}

/// Vector store over the chunk table
#[derive(Clone)]
pub struct VectorStore {
    db: StoreConnection,
}

impl VectorStore {
    pub fn new(db: StoreConnection) -> Self {
        Self { db }
    }

    /// Fresh store at `path`; an existing one is deleted first
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::new(StoreConnection::create(path)?))
    }

    /// Existing store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::new(StoreConnection::open(path)?))
    }

    /// In-memory store (for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(StoreConnection::new_in_memory()?))
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Append chunks with their embeddings, paired by position
    pub fn insert_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize, StoreError> {
        if chunks.len() != embeddings.len() {
            return Err(StoreError::EmbeddingCountMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        self.db.transaction(|tx| {
            let first_position: i64 =
                tx.query_row("SELECT COALESCE(MAX(position) + 1, 0) FROM chunks", [], |row| row.get(0))?;
            let now = Utc::now().to_rfc3339();

            let mut stmt = tx.prepare(
                "INSERT INTO chunks (id, position, content, header_path, start_index, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (offset, (chunk, embedding)) in chunks.iter().zip(embeddings).enumerate() {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    first_position + offset as i64,
                    chunk.content,
                    chunk.header_path,
                    chunk.start_index as i64,
                    encode_embedding(embedding),
                    now,
                ])?;
            }
            Ok(chunks.len())
        })
    }

    /// Set a metadata value
    pub fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.execute(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO store_metadata (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }

    /// Get a metadata value
    pub fn metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.db.execute(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM store_metadata WHERE key = ?1",
                    [key],
                    |row| row.get(0),
                )
                .optional()?)
        })
    }

    /// Number of stored chunks
    pub fn chunk_count(&self) -> Result<usize, StoreError> {
        self.db.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    /// Every chunk in insertion order
    pub fn all_chunks(&self) -> Result<Vec<StoredChunk>, StoreError> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, position, content, header_path, start_index, embedding
                 FROM chunks ORDER BY position",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Vec<u8>>(5)?,
                ))
            })?;

            let mut chunks = Vec::new();
            for row in rows {
                let (id, position, content, header_path, start_index, blob) = row?;
                let embedding = decode_embedding(&blob)
                    .ok_or_else(|| StoreError::CorruptEmbedding(id.clone()))?;
                chunks.push(StoredChunk {
                    id,
                    position: position as usize,
                    content,
                    header_path,
                    start_index: start_index as usize,
                    embedding,
                });
            }
            Ok(chunks)
        })
    }

    /// The `k` chunks most similar to `query`, best first, scored with
    /// [`relevance_from_cosine`]. Ties keep insertion order.
    pub fn similarity_search_with_relevance_scores(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let mut scored: Vec<ScoredChunk> = self
            .all_chunks()?
            .into_iter()
            .map(|chunk| {
                let score = relevance_from_cosine(cosine_similarity(query, &chunk.embedding));
                ScoredChunk { chunk, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        debug!(
            "Similarity search returned {} chunks (best score {:?})",
            scored.len(),
            scored.first().map(|s| s.score)
        );
        Ok(scored)
    }
}

/// Cosine similarity; 0 when either vector is zero or the lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Relevance `1 - d/√2` where `d = 2 - 2·cos` is the squared L2 distance
/// between the unit-normalized vectors. 1 for identical directions, about
/// -0.41 for orthogonal ones.
pub fn relevance_from_cosine(cosine: f32) -> f32 {
    1.0 - (2.0 - 2.0 * cosine) / std::f32::consts::SQRT_2
}

/// Little-endian `f32` bytes
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`encode_embedding`]; `None` when the length is not a
/// multiple of four
pub fn decode_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    )
}
