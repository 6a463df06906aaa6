/*!
 * Locating `\textipa{...}` blocks in LaTeX source.
 *
 * Blocks are matched with balanced braces so that groups such as
 * `\super{h}` or `{}` inside a block do not end it early. Escaped braces
 * (`\{`, `\}`) do not count towards the depth. A block whose closing brace
 * is missing is not a span and stays in the text unchanged.
 */

use std::ops::Range;

use super::tokens::TipaConverter;

const TEXTIPA_OPEN: &str = "\\textipa{";

/// A `\textipa{...}` occurrence in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipaSpan {
    /// Byte range of the whole block, including `\textipa{` and `}`
    pub outer: Range<usize>,
    /// Byte range of the content between the braces
    pub inner: Range<usize>,
}

impl TipaSpan {
    /// The inner content of this span within `text`
    pub fn inner_text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.inner.clone()]
    }
}

/// Find every top-level `\textipa{...}` block in `text`
pub fn extract_tipa_spans(text: &str) -> Vec<TipaSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(TEXTIPA_OPEN) {
        let start = cursor + offset;
        let inner_start = start + TEXTIPA_OPEN.len();

        match find_closing_brace(text, inner_start) {
            Some(close) => {
                spans.push(TipaSpan {
                    outer: start..close + 1,
                    inner: inner_start..close,
                });
                cursor = close + 1;
            }
            None => cursor = inner_start,
        }
    }

    spans
}

/// Byte index of the brace closing a group whose content starts at `from`
fn find_closing_brace(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                // skip the escaped byte; UTF-8 continuation bytes are never braces
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Replace each `\textipa{...}` block by its converted inner content.
///
/// A `\textipa` block nested inside another is unwrapped into the outer
/// block before conversion, so the whole block is converted once.
pub fn process_tipa_blocks(text: &str, converter: &TipaConverter) -> String {
    let spans = extract_tipa_spans(text);
    if spans.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in &spans {
        out.push_str(&text[last..span.outer.start]);
        let inner = unwrap_nested(span.inner_text(text));
        out.push_str(&converter.convert_block(&inner));
        last = span.outer.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Replace nested `\textipa{X}` wrappers with `X`
fn unwrap_nested(inner: &str) -> String {
    let spans = extract_tipa_spans(inner);
    if spans.is_empty() {
        return inner.to_string();
    }

    let mut out = String::with_capacity(inner.len());
    let mut last = 0;
    for span in &spans {
        out.push_str(&inner[last..span.outer.start]);
        out.push_str(&unwrap_nested(span.inner_text(inner)));
        last = span.outer.end;
    }
    out.push_str(&inner[last..]);
    out
}
