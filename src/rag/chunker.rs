/*!
 * Overlapping chunks for embedding.
 */

use anyhow::{Context, Result};
use text_splitter::{ChunkConfig, TextSplitter};

use super::markdown::Section;

/// A piece of a section ready to be embedded
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Header-boosted text that is embedded and returned as context
    pub content: String,
    pub header_path: String,
    /// Character offset of the chunk inside its section
    pub start_index: usize,
}

/// Splits sections into chunks of at most `chunk_size` characters
pub struct Chunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl Chunker {
    /// `chunk_overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .with_context(|| {
                format!(
                    "Invalid chunking parameters: size {} overlap {}",
                    chunk_size, chunk_overlap
                )
            })?;
        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    /// Chunk one section; every chunk gets the header boost
    pub fn chunk_section(&self, section: &Section) -> Vec<Chunk> {
        let text = section.content.as_str();
        let mut chars_seen = 0;
        let mut bytes_seen = 0;

        self.splitter
            .chunk_indices(text)
            .map(|(offset, piece)| {
                chars_seen += text[bytes_seen..offset].chars().count();
                bytes_seen = offset;
                Chunk {
                    content: header_boost(&section.header_path, piece),
                    header_path: section.header_path.clone(),
                    start_index: chars_seen,
                }
            })
            .collect()
    }

    /// Chunk every section in order
    pub fn chunk_sections(&self, sections: &[Section]) -> Vec<Chunk> {
        sections.iter().flat_map(|s| self.chunk_section(s)).collect()
    }
}

/// The header path twice, a blank line, then the chunk text
pub fn header_boost(header_path: &str, text: &str) -> String {
    format!("{hp}\n{hp}\n\n{text}", hp = header_path)
}
