/*!
 * Tests for TIPA to IPA normalization
 */

use thesisrag::tipa::{MacroTable, Normalizer, SubstitutionTable, TipaConverter, normalize_latex};

#[test]
fn test_normalize_withSuperscriptInBrackets_shouldProduceAspiratedStop() {
    let normalizer = Normalizer::default();
    assert_eq!(normalizer.normalize("\\textipa{[p\\super h]}"), "[pʰ]");
}

#[test]
fn test_normalize_withUnmappedMacro_shouldKeepItVerbatim() {
    let normalizer = Normalizer::default();
    assert_eq!(normalizer.normalize("\\textipa{\\textOlig}"), "\\textOlig");
    assert_eq!(normalizer.normalize("\\emph{word}"), "\\emph{word}");
}

#[test]
fn test_normalize_withSampleDocument_shouldReplaceEveryBlock() {
    let normalizer = Normalizer::default();
    let output = normalizer.normalize(crate::common::SAMPLE_LATEX);

    assert!(!output.contains("\\textipa"));
    assert!(output.contains("[ɕ a]"));
    assert!(output.contains("[ʃ a]"));
    assert!(output.contains("[pʰ a]"));
    assert!(output.contains("\\section{Palatals}"));
}

#[test]
fn test_normalize_appliedTwice_shouldBeIdempotent() {
    let normalizer = Normalizer::default();
    let once = normalizer.normalize(crate::common::SAMPLE_LATEX);
    assert_eq!(normalizer.normalize(&once), once);
}

#[test]
fn test_normalize_withNasalSequence_shouldPreferLongestMatch() {
    let normalizer = Normalizer::default();
    assert_eq!(normalizer.normalize("\\textipa{v\\~E\\~w}"), "vɛ̃w̃");
    assert_eq!(normalizer.normalize("\\textipa{rENka}"), "rɛŋka");
}

#[test]
fn test_normalize_withPalatalGlideToggle_shouldRespectSetting() {
    let with_glide = Normalizer::with_palatal_glide(true);
    let without_glide = Normalizer::with_palatal_glide(false);

    assert_eq!(with_glide.normalize("\\textipa{pies}"), "pjes");
    assert_eq!(without_glide.normalize("\\textipa{pies}"), "pies");
}

#[test]
fn test_normalizeLatex_withCustomMacros_shouldExpandBeforeBlocks() {
    let normalizer = Normalizer::new(
        MacroTable::from_pairs([("\\mysh", "S")]),
        TipaConverter::new(false),
    );
    assert_eq!(normalize_latex("\\textipa{\\mysh a}", &normalizer), "ʃ a");
}

#[test]
fn test_substitutionTable_withPrefixPattern_shouldNotReplaceLongerMatch() {
    let table = SubstitutionTable::new([("E", "ɛ"), ("EN", "ɛŋ"), ("N", "n")]);
    assert_eq!(table.apply("EN E N"), "ɛŋ ɛ n");
}
