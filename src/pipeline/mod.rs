/*!
 * Source preparation stages.
 *
 * `prepare` turns the LaTeX export into Markdown with readable IPA;
 * `clean` strips what the conversion leaves behind (attribute blocks,
 * internal links, figure labels, display math, footnote markers).
 */

pub mod clean;
pub mod prepare;

pub use clean::{CleanOutputs, clean};
pub use prepare::{PrepareOutputs, prepare};
