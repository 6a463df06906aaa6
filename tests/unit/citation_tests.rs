/*!
 * Tests for citation rewriting and reference extraction
 */

use thesisrag::bibliography::Bibliography;
use thesisrag::rag::citations::{
    extract_citation_keys, extract_used_sources, replace_citations_with_author_year, used_source_keys,
};
use thesisrag::rag::render_answer;

use crate::common::SAMPLE_BIB;

fn bibliography() -> Bibliography {
    Bibliography::parse(SAMPLE_BIB)
}

#[test]
fn test_extractCitationKeys_withMixedBlocks_shouldReturnSortedDistinctKeys() {
    let keys = extract_citation_keys("[@jassem2003] then [@hamann2004; @jassem2003] and me@mail.com");
    assert_eq!(keys, vec!["hamann2004", "jassem2003"]);
}

#[test]
fn test_replaceCitations_withTwoAuthors_shouldJoinWithAnd() {
    let answer = replace_citations_with_author_year("Polish has retroflexes [@jassem2003].", &bibliography());
    assert_eq!(answer, "Polish has retroflexes (Jassem and Nowak, 2003).");
}

#[test]
fn test_usedSourceKeys_shouldFollowBibliographyOrder() {
    let bib = bibliography();
    let keys = used_source_keys("First (Jassem and Nowak, 2003), then (Hamann, 2004).", &bib);
    assert_eq!(keys, vec!["hamann2004", "jassem2003"]);
}

#[test]
fn test_usedSourceKeys_withWrongYear_shouldNotMatch() {
    let keys = used_source_keys("(Hamann, 2005)", &bibliography());
    assert!(keys.is_empty());
}

#[test]
fn test_usedSourceKeys_shouldIgnoreAuthorCase() {
    let keys = used_source_keys("(HAMANN, 2004)", &bibliography());
    assert_eq!(keys, vec!["hamann2004"]);
}

#[test]
fn test_extractUsedSources_afterRewrite_shouldFormatReferences() {
    let bib = bibliography();
    let answer = replace_citations_with_author_year("See [@hamann2004].", &bib);
    let references = extract_used_sources(&answer, &bib);

    assert_eq!(references.len(), 1);
    assert!(references[0].starts_with("Silke Hamann."));
    assert!(references[0].contains("2004"));
}

#[test]
fn test_renderAnswer_withReferences_shouldListThemAfterAnswer() {
    let rendered = render_answer("Answer (Hamann, 2004).", &["Silke Hamann. Title. 2004.".to_string()]);
    assert_eq!(
        rendered,
        "Response:\n\nAnswer (Hamann, 2004).\n\nReferences:\n\nSilke Hamann. Title. 2004.\n\n"
    );
}

#[test]
fn test_renderAnswer_withoutReferences_shouldOmitSection() {
    let rendered = render_answer("Unable to find relevant context in the thesis", &[]);
    assert!(!rendered.contains("References"));
}
