/*!
 * BibTeX entries and person names.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tipa::SubstitutionTable;

/// A parsed BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Key used in `[@key]` citations
    pub cite_key: String,
    /// Lowercased entry type (`article`, `book`, ...)
    pub entry_type: String,
    /// Fields in file order, values as written (outer delimiters removed)
    pub fields: Vec<(String, String)>,
}

impl BibEntry {
    pub fn new(cite_key: impl Into<String>, entry_type: &str) -> Self {
        Self {
            cite_key: cite_key.into(),
            entry_type: entry_type.to_lowercase(),
            fields: Vec::new(),
        }
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Raw field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Field value with LaTeX decoded and grouping braces removed
    pub fn field_text(&self, key: &str) -> Option<String> {
        self.get_field(key)
            .map(decode_latex)
            .filter(|value| !value.is_empty())
    }

    /// Year, or `n.d.` when the entry has none
    pub fn year(&self) -> String {
        self.get_field("year")
            .map(|y| strip_braces(y).trim().to_string())
            .filter(|y| !y.is_empty())
            .unwrap_or_else(|| "n.d.".to_string())
    }

    /// Parsed author list
    pub fn authors(&self) -> Vec<PersonName> {
        self.get_field("author").map(parse_names).unwrap_or_default()
    }

    /// Parsed editor list
    pub fn editors(&self) -> Vec<PersonName> {
        self.get_field("editor").map(parse_names).unwrap_or_default()
    }
}

/// One person in an author or editor list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    pub first: Vec<String>,
    pub von: Vec<String>,
    pub last: Vec<String>,
    pub jr: Vec<String>,
}

impl PersonName {
    /// Parse a single name in `First von Last`, `von Last, First` or
    /// `von Last, Jr, First` form
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = split_top_level(raw, comma_separator_len)
            .into_iter()
            .map(str::trim)
            .collect();

        match parts.as_slice() {
            [] => Self::default(),
            [single] => Self::parse_first_von_last(single),
            [von_last, first] => {
                let (von, last) = split_von_last(&words(von_last));
                Self {
                    first: words(first),
                    von,
                    last,
                    jr: Vec::new(),
                }
            }
            [von_last, jr, first, ..] => {
                let (von, last) = split_von_last(&words(von_last));
                Self {
                    first: words(first),
                    von,
                    last,
                    jr: words(jr),
                }
            }
        }
    }

    fn parse_first_von_last(raw: &str) -> Self {
        let tokens = words(raw);
        let Some((last_word, rest)) = tokens.split_last() else {
            return Self::default();
        };

        // the von part starts at the first lowercase word before the last one
        let von_start = rest.iter().position(|w| starts_lowercase(w));
        let (first, von) = match von_start {
            Some(idx) => (rest[..idx].to_vec(), rest[idx..].to_vec()),
            None => (rest.to_vec(), Vec::new()),
        };

        Self {
            first,
            von,
            last: vec![last_word.clone()],
            jr: Vec::new(),
        }
    }

    /// First word of the last name, decoded (what author-year citations use)
    pub fn primary_last_name(&self) -> String {
        self.last
            .first()
            .map(|w| decode_latex(w))
            .unwrap_or_default()
    }

    /// `First von Last, Jr` with LaTeX decoded
    pub fn display(&self) -> String {
        let mut name = [&self.first, &self.von, &self.last]
            .iter()
            .flat_map(|part| part.iter())
            .map(|w| decode_latex(w))
            .collect::<Vec<_>>()
            .join(" ");
        if !self.jr.is_empty() {
            name.push_str(", ");
            name.push_str(&decode_latex(&self.jr.join(" ")));
        }
        name
    }
}

/// Parse an `and`-separated name list
pub fn parse_names(raw: &str) -> Vec<PersonName> {
    split_top_level(raw, and_separator_len)
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(PersonName::parse)
        .collect()
}

/// Length of a ` and ` separator (any case) at the start of `s`
fn and_separator_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let is_and = bytes.len() >= 5
        && bytes[0].is_ascii_whitespace()
        && bytes[1..4].eq_ignore_ascii_case(b"and")
        && bytes[4].is_ascii_whitespace();
    is_and.then_some(5)
}

fn comma_separator_len(s: &str) -> Option<usize> {
    s.starts_with(',').then_some(1)
}

/// Split `text` wherever `separator_len` reports a separator outside braces
fn split_top_level(text: &str, separator_len: impl Fn(&str) -> Option<usize>) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ if depth == 0 && text.is_char_boundary(i) => {
                if let Some(len) = separator_len(&text[i..]) {
                    parts.push(&text[start..i]);
                    i += len;
                    start = i;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Whitespace-separated words, keeping braced groups whole
fn words(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Split `von Last` words: leading lowercase words are the von part, but
/// the last word always belongs to the last name
fn split_von_last(tokens: &[String]) -> (Vec<String>, Vec<String>) {
    if tokens.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let last_von = tokens[..tokens.len() - 1]
        .iter()
        .rposition(|w| starts_lowercase(w));
    match last_von {
        Some(idx) => (tokens[..=idx].to_vec(), tokens[idx + 1..].to_vec()),
        None => (Vec::new(), tokens.to_vec()),
    }
}

fn starts_lowercase(word: &str) -> bool {
    // braced words are never part of von
    !word.starts_with('{') && word.chars().next().is_some_and(char::is_lowercase)
}

/// LaTeX accent and letter commands found in bibliographies
const LATEX_CHARACTERS: &[(&str, &str)] = &[
    // Polish
    ("\\l", "ł"),
    ("\\L", "Ł"),
    ("\\k{a}", "ą"),
    ("\\k{e}", "ę"),
    ("\\k{A}", "Ą"),
    ("\\k{E}", "Ę"),
    ("\\.{z}", "ż"),
    ("\\.{Z}", "Ż"),
    ("\\.z", "ż"),
    ("\\.Z", "Ż"),
    ("\\'{c}", "ć"),
    ("\\'{n}", "ń"),
    ("\\'{s}", "ś"),
    ("\\'{z}", "ź"),
    ("\\'{S}", "Ś"),
    ("\\'{Z}", "Ź"),
    ("\\'c", "ć"),
    ("\\'n", "ń"),
    ("\\'s", "ś"),
    ("\\'z", "ź"),
    ("\\'S", "Ś"),
    ("\\'Z", "Ź"),
    // acute
    ("\\'{a}", "á"),
    ("\\'{e}", "é"),
    ("\\'{i}", "í"),
    ("\\'{\\i}", "í"),
    ("\\'{o}", "ó"),
    ("\\'{u}", "ú"),
    ("\\'{E}", "É"),
    ("\\'a", "á"),
    ("\\'e", "é"),
    ("\\'i", "í"),
    ("\\'o", "ó"),
    ("\\'u", "ú"),
    ("\\'E", "É"),
    // grave
    ("\\`{a}", "à"),
    ("\\`{e}", "è"),
    ("\\`a", "à"),
    ("\\`e", "è"),
    // umlaut
    ("\\\"{a}", "ä"),
    ("\\\"{o}", "ö"),
    ("\\\"{u}", "ü"),
    ("\\\"{A}", "Ä"),
    ("\\\"{O}", "Ö"),
    ("\\\"{U}", "Ü"),
    ("\\\"a", "ä"),
    ("\\\"o", "ö"),
    ("\\\"u", "ü"),
    ("\\\"A", "Ä"),
    ("\\\"O", "Ö"),
    ("\\\"U", "Ü"),
    // circumflex
    ("\\^{e}", "ê"),
    ("\\^{o}", "ô"),
    ("\\^e", "ê"),
    ("\\^o", "ô"),
    // caron
    ("\\v{c}", "č"),
    ("\\v{s}", "š"),
    ("\\v{z}", "ž"),
    ("\\v{C}", "Č"),
    ("\\v{S}", "Š"),
    ("\\v{Z}", "Ž"),
    // cedilla and tilde
    ("\\c{c}", "ç"),
    ("\\~{n}", "ñ"),
    ("\\~n", "ñ"),
    // misc
    ("\\ss", "ß"),
    ("\\o", "ø"),
    ("\\O", "Ø"),
    ("\\&", "&"),
    ("---", "—"),
    ("--", "–"),
];

static LATEX_TABLE: Lazy<SubstitutionTable> =
    Lazy::new(|| SubstitutionTable::new(LATEX_CHARACTERS.iter().copied()));

static LEFTOVER_COMMAND_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\s*").unwrap());

/// Decode LaTeX letters, drop remaining commands (keeping their arguments)
/// and grouping braces
pub fn decode_latex(text: &str) -> String {
    let decoded = LATEX_TABLE.apply(text);
    let without_commands = LEFTOVER_COMMAND_REGEX.replace_all(&decoded, "");
    strip_braces(&without_commands)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `{` and `}` characters that are not escaped
pub fn strip_braces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;
    for ch in text.chars() {
        match ch {
            '{' | '}' if !escaped => {}
            _ => out.push(ch),
        }
        escaped = ch == '\\' && !escaped;
    }
    out
}
