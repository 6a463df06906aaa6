/*!
 * Retrieval-augmented question answering over the thesis Markdown.
 *
 * - `markdown`: front matter and heading sections
 * - `chunker`: overlapping chunks with a header boost
 * - `indexer`: embeddings into the vector store
 * - `engine`: retrieval, prompting and citation rewriting
 */

pub mod chunker;
pub mod citations;
pub mod engine;
pub mod indexer;
pub mod markdown;
pub mod prompts;

pub use chunker::{Chunk, Chunker};
pub use engine::{RagAnswer, RagEngine, RetrievalSettings, render_answer};
pub use indexer::{IndexReport, Indexer};
pub use markdown::{Section, structure_document};
