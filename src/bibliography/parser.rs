//! BibTeX parser built on nom
//!
//! Handles `@string` macros, `@preamble` and `@comment` blocks, braced and
//! quoted values with nesting, bare numbers and `#` concatenation. Entries
//! that fail to parse are reported and skipped; parsing resumes at the next
//! `@`.

use log::warn;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
};
use std::collections::HashMap;

use super::entry::BibEntry;

/// Where an entry could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibParseError {
    pub line: usize,
    pub message: String,
}

/// Everything found in a `.bib` file
#[derive(Debug, Clone, Default)]
pub struct BibParseResult {
    pub entries: Vec<BibEntry>,
    pub strings: HashMap<String, String>,
    pub preambles: Vec<String>,
    pub errors: Vec<BibParseError>,
}

enum AtBlock {
    Entry(BibEntry),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Parse BibTeX source text
pub fn parse_bibtex(input: &str) -> BibParseResult {
    let mut result = BibParseResult::default();
    let mut remaining = input;

    loop {
        // anything outside an @ block is a comment
        let Some(at) = remaining.find('@') else {
            break;
        };
        remaining = &remaining[at..];

        match parse_at_block(remaining, &result.strings) {
            Ok((rest, block)) => {
                match block {
                    AtBlock::Entry(entry) => result.entries.push(entry),
                    AtBlock::String(key, value) => {
                        result.strings.insert(key.to_lowercase(), value);
                    }
                    AtBlock::Preamble(text) => result.preambles.push(text),
                    AtBlock::Comment => {}
                }
                remaining = rest;
            }
            Err(_) => {
                let line = input[..input.len() - remaining.len()].matches('\n').count() + 1;
                warn!("Skipping malformed BibTeX block at line {}", line);
                result.errors.push(BibParseError {
                    line,
                    message: "Failed to parse entry".to_string(),
                });
                remaining = &remaining[1..];
            }
        }
    }

    result
}

fn parse_at_block<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, block_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match block_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtBlock::String(key, value)))
        }
        "preamble" => {
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char('{')(rest)?;
            let (rest, value) = parse_field_value(rest, strings)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char('}')(rest)?;
            Ok((rest, AtBlock::Preamble(value)))
        }
        "comment" => {
            let (rest, _) = multispace0(rest)?;
            if rest.starts_with('{') {
                let (rest, _) = braced_content(rest)?;
                Ok((rest, AtBlock::Comment))
            } else {
                let end = rest.find('\n').unwrap_or(rest.len());
                Ok((&rest[end..], AtBlock::Comment))
            }
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, block_type, strings)?;
            Ok((rest, AtBlock::Entry(entry)))
        }
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || "_-".contains(c))(input)
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) = identifier(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;
    Ok((rest, (key.to_string(), value)))
}

fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibEntry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, cite_key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (mut rest, _) = char(',')(rest)?;

    let mut entry = BibEntry::new(cite_key, entry_type);
    loop {
        let (after_ws, _) = multispace0(rest)?;
        if let Some(after_close) = after_ws.strip_prefix('}') {
            return Ok((after_close, entry));
        }

        let (after_field, (key, value)) = parse_field(after_ws, strings)?;
        entry.add_field(key.to_lowercase(), value);

        let (after_field, _) = multispace0(after_field)?;
        rest = after_field.strip_prefix(',').unwrap_or(after_field);
    }
}

fn parse_field<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, (String, String)> {
    let (rest, key) = identifier(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    Ok((rest, (key.to_string(), value)))
}

/// A value made of `#`-joined parts
fn parse_field_value<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    let mut value = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        let (rest, part) = alt((
            map(braced_content, |s: &str| s[1..s.len() - 1].to_string()),
            quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(identifier, |name: &str| {
                strings
                    .get(&name.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            }),
        ))(rest)?;
        value.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(next) => remaining = next,
            None => return Ok((rest, value)),
        }
    }
}

/// `{...}` with nesting, returned with its outer braces
fn braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)));
    }

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)))
}

/// `"..."`; quotes inside braces do not end the value
fn quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)));
    }

    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if depth == 0 => return Ok((&input[pos + 1..], input[1..pos].to_string())),
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)))
}
