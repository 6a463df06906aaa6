/*!
 * TIPA to IPA normalization of LaTeX source.
 *
 * Normalization runs in two passes over the document:
 * 1. custom macros are expanded everywhere ([`MacroTable`]);
 * 2. every `\textipa{...}` block is replaced by its IPA rendering
 *    ([`TipaConverter`]).
 *
 * Both passes are total: anything without a table entry passes through.
 */

pub mod extractor;
pub mod macros;
pub mod table;
pub mod tokens;

pub use extractor::{TipaSpan, extract_tipa_spans, process_tipa_blocks};
pub use macros::MacroTable;
pub use table::SubstitutionTable;
pub use tokens::TipaConverter;

/// Macro expansion followed by TIPA block conversion
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    macros: MacroTable,
    converter: TipaConverter,
}

impl Normalizer {
    /// Create a normalizer from its two passes
    pub fn new(macros: MacroTable, converter: TipaConverter) -> Self {
        Self { macros, converter }
    }

    /// Standard macros, with the palatal glide rule on or off
    pub fn with_palatal_glide(palatal_glide: bool) -> Self {
        Self::new(MacroTable::standard(), TipaConverter::new(palatal_glide))
    }

    /// Normalize a LaTeX document
    pub fn normalize(&self, text: &str) -> String {
        let expanded = self.macros.apply(text);
        process_tipa_blocks(&expanded, &self.converter)
    }
}

/// Normalize a LaTeX document with the given normalizer
pub fn normalize_latex(text: &str, normalizer: &Normalizer) -> String {
    normalizer.normalize(text)
}
