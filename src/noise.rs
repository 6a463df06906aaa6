/*!
 * Removal of conversion artifacts from pandoc Markdown.
 *
 * Pandoc leaves attribute blocks, internal cross-reference links, image
 * embeds, display math, footnote markers and escaped figure labels in its
 * output. None of it is useful for retrieval, so every match of a fixed set
 * of patterns is collected into an inventory, and the inventory is then
 * removed from the text.
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tipa::SubstitutionTable;

/// A kind of conversion artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseCategory {
    /// `{...}` attribute blocks not starting with a newline
    CurlyBlocks,
    /// `[text](#anchor)` links
    InternalLinks,
    /// `![alt](path)` with optional `{...}` or `(...)` suffix
    ImageBlocks,
    /// `(#anchor)` references
    ParenthesizedRefs,
    /// `$$...$$` on a single line
    DollarBlocks,
    /// `[^N]` footnote markers
    Footnotes,
    /// `\[fig:...\]` and `\[app:...\]` labels
    SquareBracketLabels,
}

impl NoiseCategory {
    /// Every category in inventory order
    pub const ALL: [NoiseCategory; 7] = [
        NoiseCategory::CurlyBlocks,
        NoiseCategory::InternalLinks,
        NoiseCategory::ImageBlocks,
        NoiseCategory::ParenthesizedRefs,
        NoiseCategory::DollarBlocks,
        NoiseCategory::Footnotes,
        NoiseCategory::SquareBracketLabels,
    ];

    /// Key used in the JSON inventory
    pub fn name(&self) -> &'static str {
        match self {
            NoiseCategory::CurlyBlocks => "curly_blocks",
            NoiseCategory::InternalLinks => "internal_links",
            NoiseCategory::ImageBlocks => "image_blocks",
            NoiseCategory::ParenthesizedRefs => "parenthesized_refs",
            NoiseCategory::DollarBlocks => "dollar_blocks",
            NoiseCategory::Footnotes => "footnotes",
            NoiseCategory::SquareBracketLabels => "square_bracket_labels",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            NoiseCategory::CurlyBlocks => &CURLY_BLOCK_REGEX,
            NoiseCategory::InternalLinks => &INTERNAL_LINK_REGEX,
            NoiseCategory::ImageBlocks => &IMAGE_BLOCK_REGEX,
            NoiseCategory::ParenthesizedRefs => &PARENTHESIZED_REF_REGEX,
            NoiseCategory::DollarBlocks => &DOLLAR_BLOCK_REGEX,
            NoiseCategory::Footnotes => &FOOTNOTE_REGEX,
            NoiseCategory::SquareBracketLabels => &SQUARE_BRACKET_LABEL_REGEX,
        }
    }
}

impl fmt::Display for NoiseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// The regex crate has no lookahead, so "not starting with a newline" is
// spelled as an explicit first character class.
static CURLY_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}\n][^}]*\}").unwrap());
static INTERNAL_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]\(#.*?\)").unwrap());
static IMAGE_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)(?:\{[^}]+\}|\([^)]+\))?").unwrap());
static PARENTHESIZED_REF_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(#.*?\)").unwrap());
static DOLLAR_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$.*\$\$").unwrap());
static FOOTNOTE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\^[0-9][0-9]?\]").unwrap());
static SQUARE_BRACKET_LABEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\[(?:fig|app):[^\]]+\\\]").unwrap());

/// Deduplicated matches per category, each list sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseInventory {
    #[serde(default)]
    pub curly_blocks: Vec<String>,
    #[serde(default)]
    pub internal_links: Vec<String>,
    #[serde(default)]
    pub image_blocks: Vec<String>,
    #[serde(default)]
    pub parenthesized_refs: Vec<String>,
    #[serde(default)]
    pub dollar_blocks: Vec<String>,
    #[serde(default)]
    pub footnotes: Vec<String>,
    #[serde(default)]
    pub square_bracket_labels: Vec<String>,
}

impl NoiseInventory {
    /// Matches recorded for one category
    pub fn get(&self, category: NoiseCategory) -> &[String] {
        match category {
            NoiseCategory::CurlyBlocks => &self.curly_blocks,
            NoiseCategory::InternalLinks => &self.internal_links,
            NoiseCategory::ImageBlocks => &self.image_blocks,
            NoiseCategory::ParenthesizedRefs => &self.parenthesized_refs,
            NoiseCategory::DollarBlocks => &self.dollar_blocks,
            NoiseCategory::Footnotes => &self.footnotes,
            NoiseCategory::SquareBracketLabels => &self.square_bracket_labels,
        }
    }

    fn get_mut(&mut self, category: NoiseCategory) -> &mut Vec<String> {
        match category {
            NoiseCategory::CurlyBlocks => &mut self.curly_blocks,
            NoiseCategory::InternalLinks => &mut self.internal_links,
            NoiseCategory::ImageBlocks => &mut self.image_blocks,
            NoiseCategory::ParenthesizedRefs => &mut self.parenthesized_refs,
            NoiseCategory::DollarBlocks => &mut self.dollar_blocks,
            NoiseCategory::Footnotes => &mut self.footnotes,
            NoiseCategory::SquareBracketLabels => &mut self.square_bracket_labels,
        }
    }

    /// All distinct removed strings, longest first
    pub fn flatten(&self) -> Vec<String> {
        let mut all: Vec<String> = NoiseCategory::ALL
            .iter()
            .flat_map(|category| self.get(*category).iter().cloned())
            .collect();
        all.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        all.dedup();
        all
    }

    /// Number of distinct entries across categories
    pub fn total(&self) -> usize {
        NoiseCategory::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Result of cleaning a document
#[derive(Debug, Clone)]
pub struct NoiseReport {
    /// Text with every inventory entry removed
    pub cleaned: String,
    /// What was removed
    pub inventory: NoiseInventory,
}

/// Pattern-based noise extraction and removal
pub struct NoiseFilter;

impl NoiseFilter {
    /// Collect every match of every category in `text`
    pub fn extract(text: &str) -> NoiseInventory {
        let mut inventory = NoiseInventory::default();
        for category in NoiseCategory::ALL {
            let mut found: Vec<String> = category
                .regex()
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();
            found.sort();
            found.dedup();
            *inventory.get_mut(category) = found;
        }
        inventory
    }

    /// Remove every inventory entry from `text` in one longest-first scan
    pub fn remove(text: &str, inventory: &NoiseInventory) -> String {
        let table = SubstitutionTable::new(
            inventory
                .flatten()
                .into_iter()
                .map(|noise| (noise, String::new())),
        );
        table.apply(text)
    }

    /// Extract the inventory and remove it
    pub fn clean(text: &str) -> NoiseReport {
        let inventory = Self::extract(text);
        let cleaned = Self::remove(text, &inventory);
        NoiseReport { cleaned, inventory }
    }
}
