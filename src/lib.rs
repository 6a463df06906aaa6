/*!
 * # thesisrag - question answering over a LaTeX thesis
 *
 * A Rust library that turns a phonetics thesis written in LaTeX into a
 * searchable corpus and answers questions about it with citations.
 *
 * ## Features
 *
 * - TIPA to Unicode IPA normalization of the LaTeX source
 * - LaTeX to Markdown conversion through pandoc
 * - Removal of conversion noise with a reviewable inventory
 * - Header-aware chunking into a SQLite vector store
 * - Retrieval-augmented answers with author-year citations and references
 * - Synthetic question generation and model-judged evaluation
 * - SVG charts of evaluation scores
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `tipa`: TIPA macro expansion and IPA substitution
 * - `noise`: Conversion noise inventory and removal
 * - `pandoc`: External converter
 * - `pipeline`: `prepare` and `clean` stages
 * - `bibliography`: BibTeX parsing and plain-style formatting
 * - `store`: SQLite vector store
 * - `rag`: Chunking, indexing, retrieval and answering
 * - `evaluation`: Question generation, scoring, results and charts
 * - `providers`: OpenAI and Anthropic clients plus a mock
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod bibliography;
pub mod credentials;
pub mod errors;
pub mod evaluation;
pub mod file_utils;
pub mod noise;
pub mod pandoc;
pub mod pipeline;
pub mod progress;
pub mod providers;
pub mod rag;
pub mod store;
pub mod tipa;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use bibliography::Bibliography;
pub use errors::{AppError, ConversionError, ProviderError, StoreError};
pub use noise::{NoiseFilter, NoiseInventory};
pub use tipa::{Normalizer, normalize_latex};
