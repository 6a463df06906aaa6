/*!
 * Citation post-processing for generated answers.
 *
 * The model is asked to keep the Pandoc citation tags it sees in the
 * context (`[@key]`, `[@a; @b]`). Those tags are rewritten to author-year
 * form, and the author-year citations of the final answer are matched back
 * to bibliography entries to print a reference list.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

use crate::bibliography::{BibEntry, Bibliography};

static CITATION_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[@([^\]]+)\]").unwrap());
static CITATION_KEY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([^\s;,\]]+)").unwrap());
static KEY_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;,\s]+").unwrap());
static AUTHOR_YEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^,]+),\s*([0-9]{4}|n\.d\.)\)").unwrap());
static AND_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+and\s+").unwrap());

/// Distinct citation keys used in `[@...]` blocks, sorted
pub fn extract_citation_keys(text: &str) -> Vec<String> {
    let keys: BTreeSet<String> = CITATION_BLOCK_REGEX
        .find_iter(text)
        .flat_map(|block| CITATION_KEY_REGEX.captures_iter(block.as_str()))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    keys.into_iter().collect()
}

/// Author part of an author-year citation
pub fn author_label(entry: &BibEntry) -> String {
    let last_names: Vec<String> = entry
        .authors()
        .iter()
        .map(|p| p.primary_last_name())
        .collect();

    match last_names.as_slice() {
        [] => "Unknown".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [first, ..] => format!("{} et al.", first),
    }
}

/// `(Author, Year)` for one entry
pub fn author_year(entry: &BibEntry) -> String {
    format!("({}, {})", author_label(entry), entry.year())
}

/// Rewrite every `[@key; @key2]` block as `(Author, Year) (Author2, Year)`.
///
/// Unknown keys render as nothing; a block without keys is left untouched.
pub fn replace_citations_with_author_year(answer: &str, bibliography: &Bibliography) -> String {
    CITATION_BLOCK_REGEX
        .replace_all(answer, |caps: &Captures| {
            let keys: Vec<&str> = KEY_SEPARATOR_REGEX
                .split(&caps[1])
                .map(|part| part.trim_start_matches('@').trim())
                .filter(|key| !key.is_empty())
                .collect();

            if keys.is_empty() {
                return caps[0].to_string();
            }

            keys.iter()
                .map(|key| bibliography.get(key).map(author_year).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .into_owned()
}

/// Lowercased first author named in the author part of a citation
fn first_cited_author(author_block: &str) -> String {
    let first = AND_SEPARATOR_REGEX
        .split(author_block)
        .next()
        .unwrap_or_default();
    let first = first.split("et al.").next().unwrap_or_default();
    first.trim().to_lowercase()
}

/// Keys of the bibliography entries cited in author-year form, in
/// bibliography order
pub fn used_source_keys(answer: &str, bibliography: &Bibliography) -> Vec<String> {
    let cited: Vec<(String, String)> = AUTHOR_YEAR_REGEX
        .captures_iter(answer)
        .map(|caps| (first_cited_author(&caps[1]), caps[2].trim().to_string()))
        .collect();

    if cited.is_empty() {
        return Vec::new();
    }

    bibliography
        .entries()
        .filter(|entry| {
            let Some(first_author) = entry.authors().first().map(|p| p.primary_last_name().to_lowercase())
            else {
                return false;
            };
            let year = entry.year();
            cited
                .iter()
                .any(|(author, cited_year)| *author == first_author && *cited_year == year)
        })
        .map(|entry| entry.cite_key.clone())
        .fold(Vec::new(), |mut keys, key| {
            if !keys.contains(&key) {
                keys.push(key);
            }
            keys
        })
}

/// Plain-style references for the sources cited in `answer`
pub fn extract_used_sources(answer: &str, bibliography: &Bibliography) -> Vec<String> {
    used_source_keys(answer, bibliography)
        .iter()
        .map(|key| bibliography.format_entry(key))
        .collect()
}
