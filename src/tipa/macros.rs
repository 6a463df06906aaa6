/*!
 * Custom phonetic macros defined in the thesis preamble.
 *
 * These macros appear both inside and outside `\textipa{...}` blocks and are
 * expanded over the whole document before TIPA blocks are converted.
 */

use once_cell::sync::Lazy;

use super::table::SubstitutionTable;

/// Macro name to literal Unicode pairs
const STANDARD_MACROS: &[(&str, &str)] = &[
    // tie-bar affricates
    ("\\texttoptiebar{\\textrtaild\\textrtailz}", "d͡ʐ"),
    ("\\texttoptiebar{\\textdctzlig}", "d͡ʑ"),
    ("\\texttoptiebar{t\\textrtails}", "t͡ʂ"),
    ("\\texttoptiebar{\\texttctclig}", "t͡ɕ"),
    ("\\texttoptiebar{ts}", "t͡s"),
    ("\\texttoptiebar{dz}", "d͡z"),
    // single segments
    ("\\textltailn", "ɲ"),
    ("\\textctc", "ɕ"),
    ("\\textctz", "ʑ"),
    ("\\textrtailz", "ʐ"),
    ("\\textrtails", "ʂ"),
];

static STANDARD_TABLE: Lazy<SubstitutionTable> =
    Lazy::new(|| SubstitutionTable::new(STANDARD_MACROS.iter().copied()));

/// Expands the thesis' custom macros to Unicode
#[derive(Debug, Clone)]
pub struct MacroTable {
    table: SubstitutionTable,
}

impl MacroTable {
    /// The macro set used by the thesis preamble
    pub fn standard() -> Self {
        Self {
            table: STANDARD_TABLE.clone(),
        }
    }

    /// A macro table from arbitrary pairs
    pub fn from_pairs<I, P, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        Self {
            table: SubstitutionTable::new(pairs),
        }
    }

    /// Replace every known macro occurrence in `text`
    pub fn apply(&self, text: &str) -> String {
        self.table.apply(text)
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        Self::standard()
    }
}
