//! Plain-style reference formatting
//!
//! Renders entries the way the classic BibTeX `plain` style does, as plain
//! text: authors, title, venue details and year, each block ending with a
//! period.

use super::entry::{BibEntry, PersonName, decode_latex};

/// Format one entry as a plain-style reference
pub fn format_plain(entry: &BibEntry) -> String {
    let mut blocks: Vec<String> = Vec::new();

    let authors = format_people(&entry.authors());
    if !authors.is_empty() {
        blocks.push(authors);
    }

    if let Some(title) = entry.field_text("title") {
        let title = match entry.entry_type.as_str() {
            "book" | "proceedings" | "manual" => title,
            _ => sentence_case(entry.get_field("title").unwrap_or_default()),
        };
        blocks.push(title);
    }

    let venue = match entry.entry_type.as_str() {
        "article" => article_venue(entry),
        "book" | "booklet" | "manual" => book_venue(entry),
        "inproceedings" | "conference" | "incollection" | "inbook" => collection_venue(entry),
        "phdthesis" => thesis_venue(entry, "PhD thesis"),
        "mastersthesis" => thesis_venue(entry, "Master's thesis"),
        "techreport" => report_venue(entry),
        _ => misc_venue(entry),
    };
    blocks.extend(venue);

    blocks
        .into_iter()
        .map(|block| terminate(&block))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `A`, `A and B`, `A, B, and C`
pub fn format_people(people: &[PersonName]) -> String {
    let names: Vec<String> = people.iter().map(PersonName::display).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

fn article_venue(entry: &BibEntry) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(journal) = entry.field_text("journal") {
        parts.push(journal);
    }

    let mut volume = entry.field_text("volume").unwrap_or_default();
    if let Some(number) = entry.field_text("number") {
        volume.push_str(&format!("({})", number));
    }
    if let Some(pages) = entry.field_text("pages") {
        if volume.is_empty() {
            parts.push(format!("pages {}", pages));
        } else {
            volume.push_str(&format!(":{}", pages));
        }
    }
    if !volume.is_empty() {
        parts.push(volume);
    }
    parts.push(entry.year());

    vec![parts.join(", ")]
}

fn book_venue(entry: &BibEntry) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(edition) = entry.field_text("edition") {
        blocks.push(format!("{} edition", edition));
    }
    let mut publication = Vec::new();
    for key in ["publisher", "organization", "address"] {
        if let Some(value) = entry.field_text(key) {
            publication.push(value);
        }
    }
    publication.push(entry.year());
    blocks.push(publication.join(", "));
    blocks
}

fn collection_venue(entry: &BibEntry) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut container = Vec::new();
    let editors = entry.editors();
    if !editors.is_empty() {
        let label = if editors.len() == 1 { "editor" } else { "editors" };
        container.push(format!("{}, {}", format_people(&editors), label));
    }
    if let Some(booktitle) = entry.field_text("booktitle") {
        container.push(booktitle);
    }
    if let Some(pages) = entry.field_text("pages") {
        container.push(format!("pages {}", pages));
    }
    if !container.is_empty() {
        blocks.push(format!("In {}", container.join(", ")));
    }

    let mut publication = Vec::new();
    for key in ["publisher", "address"] {
        if let Some(value) = entry.field_text(key) {
            publication.push(value);
        }
    }
    publication.push(entry.year());
    blocks.push(publication.join(", "));
    blocks
}

fn thesis_venue(entry: &BibEntry, kind: &str) -> Vec<String> {
    let mut parts = vec![kind.to_string()];
    for key in ["school", "address"] {
        if let Some(value) = entry.field_text(key) {
            parts.push(value);
        }
    }
    parts.push(entry.year());
    vec![parts.join(", ")]
}

fn report_venue(entry: &BibEntry) -> Vec<String> {
    let mut label = entry
        .field_text("type")
        .unwrap_or_else(|| "Technical Report".to_string());
    if let Some(number) = entry.field_text("number") {
        label.push(' ');
        label.push_str(&number);
    }
    let mut parts = vec![label];
    for key in ["institution", "address"] {
        if let Some(value) = entry.field_text(key) {
            parts.push(value);
        }
    }
    parts.push(entry.year());
    vec![parts.join(", ")]
}

fn misc_venue(entry: &BibEntry) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(published) = entry.field_text("howpublished") {
        blocks.push(published);
    }
    if let Some(url) = entry.get_field("url") {
        blocks.push(format!("URL: {}", url.trim()));
    }
    blocks.push(entry.year());
    if let Some(note) = entry.field_text("note") {
        blocks.push(note);
    }
    blocks
}

/// Lowercase everything after the first letter, except braced groups
fn sentence_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    let mut seen_first = false;
    for ch in raw.chars() {
        match ch {
            '{' => {
                depth += 1;
                out.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(ch);
            }
            c if depth > 0 => out.push(c),
            c if c.is_alphabetic() && seen_first => out.extend(c.to_lowercase()),
            c => {
                if c.is_alphabetic() {
                    seen_first = true;
                }
                out.push(c);
            }
        }
    }
    decode_latex(&out)
}

/// End a block with a period unless it already ends with punctuation
fn terminate(block: &str) -> String {
    let trimmed = block.trim_end();
    if trimmed.ends_with(['.', '?', '!']) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}
