/*!
 * Ordered literal substitution tables.
 *
 * A table holds `(pattern, replacement)` pairs sorted by descending pattern
 * length and rewrites text in a single forward scan: at every position the
 * longest matching pattern wins, its replacement is emitted, and scanning
 * resumes after the consumed input. Replacement output is never rescanned.
 *
 * A pattern that is a bare control word (`\textctc`) only matches where the
 * control word ends, so `\l` never matches the start of `\label`.
 */

use std::collections::HashMap;

/// A longest-match-first substitution table
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    /// Entries sorted by descending pattern length (in chars), stable
    entries: Vec<(String, String)>,
    /// Entry indices grouped by the first char of their pattern
    by_first_char: HashMap<char, Vec<usize>>,
    /// Copy unknown `\controlword` sequences verbatim instead of scanning
    /// their letters individually
    protect_control_words: bool,
}

impl SubstitutionTable {
    /// Build a table from pattern/replacement pairs.
    ///
    /// Empty patterns are ignored. When two patterns have the same length
    /// the one inserted first is tried first.
    pub fn new<I, P, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let mut entries: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(p, r)| (p.into(), r.into()))
            .filter(|(p, _)| !p.is_empty())
            .collect();
        entries.sort_by_key(|(p, _)| std::cmp::Reverse(p.chars().count()));

        let mut by_first_char: HashMap<char, Vec<usize>> = HashMap::new();
        for (idx, (pattern, _)) in entries.iter().enumerate() {
            if let Some(first) = pattern.chars().next() {
                by_first_char.entry(first).or_default().push(idx);
            }
        }

        Self {
            entries,
            by_first_char,
            protect_control_words: false,
        }
    }

    /// Treat unmatched LaTeX control words (`\` followed by ASCII letters)
    /// as opaque tokens that pass through unchanged
    pub fn protecting_control_words(mut self) -> Self {
        self.protect_control_words = true;
        self
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in match-priority order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }

    /// Look up the replacement for an exact pattern
    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, r)| r.as_str())
    }

    /// Rewrite `text`, replacing every match with its mapped value
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(first) = rest.chars().next() {
            if let Some((consumed, replacement)) = self.longest_match(rest, first) {
                out.push_str(replacement);
                rest = &rest[consumed..];
                continue;
            }

            if self.protect_control_words && first == '\\' {
                let word_len = control_word_len(rest);
                if word_len > 0 {
                    out.push_str(&rest[..word_len]);
                    rest = &rest[word_len..];
                    continue;
                }
            }

            out.push(first);
            rest = &rest[first.len_utf8()..];
        }

        out
    }

    /// Find the longest pattern that prefixes `rest`
    fn longest_match(&self, rest: &str, first: char) -> Option<(usize, &str)> {
        let candidates = self.by_first_char.get(&first)?;
        candidates.iter().find_map(|&idx| {
            let (pattern, replacement) = &self.entries[idx];
            let matches = rest.starts_with(pattern.as_str())
                && !(is_control_word(pattern) && continues_word(&rest[pattern.len()..]));
            matches.then(|| (pattern.len(), replacement.as_str()))
        })
    }
}

/// `\` followed only by ASCII letters
fn is_control_word(pattern: &str) -> bool {
    pattern.len() > 1 && control_word_len(pattern) == pattern.len()
}

fn continues_word(after: &str) -> bool {
    after.bytes().next().is_some_and(|b| b.is_ascii_alphabetic())
}

/// Byte length of a `\letters` control word at the start of `text`, or 0
fn control_word_len(text: &str) -> usize {
    if !text.starts_with('\\') {
        return 0;
    }
    let letters = text[1..]
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if letters == 0 { 0 } else { 1 + letters }
}
