/*!
 * Markdown structure for retrieval.
 *
 * The final thesis Markdown is cut into [`Section`]s at `#` to `####`
 * headings. Each section remembers the chain of headings above it, which is
 * later repeated at the top of every chunk.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Header path of the synthetic title-page section
pub const FRONT_MATTER_PATH: &str = "Front Matter > Title Page";

/// Text that introduces the title-page section
pub const FRONT_MATTER_PREAMBLE: &str = "This is the title page and metadata of the thesis.\n";

/// Deepest heading level that starts a new section
const MAX_HEADER_LEVEL: usize = 4;

static FRONT_MATTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)---\s*(.*?)\s*## Abstract").unwrap());

/// A run of Markdown body text under one heading chain
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub content: String,
    pub header_path: String,
}

/// Text between the first `---` and the `## Abstract` heading; empty when
/// either is missing
pub fn extract_front_matter(markdown: &str) -> &str {
    FRONT_MATTER_REGEX
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// The title-page section built from the front matter
pub fn front_matter_section(markdown: &str) -> Section {
    Section {
        content: format!("{}{}", FRONT_MATTER_PREAMBLE, extract_front_matter(markdown)),
        header_path: FRONT_MATTER_PATH.to_string(),
    }
}

/// `Headers: H1 > H2 > ...` for the non-empty headings in `headers`
pub fn build_header_path(headers: &[Option<String>]) -> String {
    let names: Vec<&str> = headers
        .iter()
        .filter_map(|h| h.as_deref())
        .filter(|h| !h.is_empty())
        .collect();
    format!("Headers: {}", names.join(" > "))
}

/// Heading level and title when `line` is a `#`..`####` heading
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > MAX_HEADER_LEVEL {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() || rest.starts_with(' ') {
        Some((level, rest.trim()))
    } else {
        None
    }
}

/// Split Markdown into sections at headings.
///
/// Lines are trimmed; blank lines end a paragraph and consecutive
/// paragraphs under the same headings are joined with `"  \n"`. Heading
/// lines are dropped from the content. `#` lines inside fenced code blocks
/// are kept as text.
pub fn split_markdown(markdown: &str) -> Vec<Section> {
    // (content, headers at the time the paragraph ended)
    let mut paragraphs: Vec<(String, Vec<Option<String>>)> = Vec::new();
    let mut headers: Vec<Option<String>> = vec![None; MAX_HEADER_LEVEL];
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<&'static str> = None;

    let mut flush = |current: &mut Vec<&str>, headers: &[Option<String>]| {
        if !current.is_empty() {
            paragraphs.push((current.join("\n"), headers.to_vec()));
            current.clear();
        }
    };

    for raw_line in markdown.lines() {
        let line = raw_line.trim();

        match fence {
            None => {
                if line.starts_with("```") && line.matches("```").count() == 1 {
                    fence = Some("```");
                } else if line.starts_with("~~~") && line.matches("~~~").count() == 1 {
                    fence = Some("~~~");
                }
            }
            Some(marker) => {
                if line.starts_with(marker) {
                    fence = None;
                    current.push(line);
                    continue;
                }
            }
        }

        if fence.is_some() {
            current.push(line);
            continue;
        }

        if let Some((level, title)) = parse_heading(line) {
            flush(&mut current, &headers);
            headers[level - 1] = Some(title.to_string());
            for deeper in headers.iter_mut().skip(level) {
                *deeper = None;
            }
            continue;
        }

        if line.is_empty() {
            flush(&mut current, &headers);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &headers);

    let mut sections: Vec<(String, Vec<Option<String>>)> = Vec::new();
    for (content, paragraph_headers) in paragraphs {
        match sections.last_mut() {
            Some((text, last_headers)) if *last_headers == paragraph_headers => {
                text.push_str("  \n");
                text.push_str(&content);
            }
            _ => sections.push((content, paragraph_headers)),
        }
    }

    sections
        .into_iter()
        .map(|(content, headers)| Section {
            content,
            header_path: build_header_path(&headers),
        })
        .collect()
}

/// Title-page section followed by the heading sections
pub fn structure_document(markdown: &str) -> Vec<Section> {
    let mut sections = vec![front_matter_section(markdown)];
    sections.extend(split_markdown(markdown));
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const THESIS: &str = "---\ntitle: Sibilants in Polish\nauthor: A. Student\n---\n\n## Abstract\n\nShort abstract.\n\n# Introduction\n\nFirst paragraph.\n\nSecond paragraph.\n\n## Background\n\n### Phonology\n\nDetails here.\n\n# Method\n\nSteps.\n";

    #[test]
    fn test_extractFrontMatter_shouldReturnTextBeforeAbstract() {
        assert_eq!(
            extract_front_matter(THESIS),
            "title: Sibilants in Polish\nauthor: A. Student\n---"
        );
    }

    #[test]
    fn test_extractFrontMatter_withoutAbstract_shouldBeEmpty() {
        assert_eq!(extract_front_matter("---\ntitle: x\n---\n# Intro"), "");
        let section = front_matter_section("no front matter");
        assert_eq!(section.content, FRONT_MATTER_PREAMBLE);
        assert_eq!(section.header_path, FRONT_MATTER_PATH);
    }

    #[test]
    fn test_splitMarkdown_shouldTrackHeaderPath() {
        let sections = split_markdown(THESIS);
        let paths: Vec<&str> = sections.iter().map(|s| s.header_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "Headers: ",
                "Headers: Abstract",
                "Headers: Introduction",
                "Headers: Introduction > Background > Phonology",
                "Headers: Method",
            ]
        );
        assert_eq!(sections[2].content, "First paragraph.  \nSecond paragraph.");
    }

    #[test]
    fn test_splitMarkdown_shouldResetDeeperHeadings() {
        let sections = split_markdown("# A\n## B\ntext b\n# C\ntext c\n");
        assert_eq!(sections[0].header_path, "Headers: A > B");
        assert_eq!(sections[1].header_path, "Headers: C");
    }

    #[test]
    fn test_splitMarkdown_withFencedCode_shouldNotSplitOnHash() {
        let sections = split_markdown("# Code\n```\n# not a heading\n```\nafter\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "```\n# not a heading\n```\nafter");
    }

    #[test]
    fn test_parseHeading_shouldRequireSpaceAndMaxDepth() {
        assert_eq!(parse_heading("## Title"), Some((2, "Title")));
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("##### Deep"), None);
    }

    #[test]
    fn test_structureDocument_shouldStartWithTitlePage() {
        let sections = structure_document(THESIS);
        assert_eq!(sections[0].header_path, FRONT_MATTER_PATH);
        assert!(sections[0].content.starts_with(FRONT_MATTER_PREAMBLE));
        assert_eq!(sections.len(), 6);
    }
}
