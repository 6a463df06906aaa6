/*!
 * Bibliography loading and lookup.
 *
 * The thesis bibliography is read once, indexed by cite key, and used to
 * turn `[@key]` citations in generated answers into author-year form and to
 * list the references an answer relies on.
 */

pub mod entry;
pub mod formatter;
pub mod parser;

use anyhow::Result;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::file_utils::FileManager;

pub use entry::{BibEntry, PersonName, decode_latex, parse_names};
pub use formatter::format_plain;
pub use parser::{BibParseResult, parse_bibtex};

/// An indexed set of BibTeX entries
#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    entries: Vec<BibEntry>,
    by_key: HashMap<String, usize>,
}

impl Bibliography {
    /// Build from parsed entries; a repeated key keeps its first entry
    pub fn from_entries(entries: Vec<BibEntry>) -> Self {
        let mut by_key = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if by_key.contains_key(&entry.cite_key) {
                warn!("Duplicate BibTeX key ignored: {}", entry.cite_key);
                continue;
            }
            by_key.insert(entry.cite_key.clone(), idx);
        }
        Self { entries, by_key }
    }

    /// Parse BibTeX source
    pub fn parse(source: &str) -> Self {
        let parsed = parse_bibtex(source);
        if !parsed.errors.is_empty() {
            warn!("{} BibTeX blocks could not be parsed", parsed.errors.len());
        }
        Self::from_entries(parsed.entries)
    }

    /// Load a `.bib` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = FileManager::read_to_string(&path)?;
        let bibliography = Self::parse(&source);
        debug!(
            "Loaded {} bibliography entries from {:?}",
            bibliography.len(),
            path.as_ref()
        );
        Ok(bibliography)
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    /// Entries in file order
    pub fn entries(&self) -> impl Iterator<Item = &BibEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain-style reference for `key`
    pub fn format_entry(&self, key: &str) -> String {
        match self.get(key) {
            Some(entry) => format_plain(entry),
            None => format!("[Reference not found for key: {}]", key),
        }
    }
}
