/*!
 * End-to-end tests of the prepare and clean stages
 */

use std::fs;

use thesisrag::errors::ConversionError;
use thesisrag::pandoc::{ConversionRequest, DocumentConverter, PandocConverter};
use thesisrag::pipeline::{clean, prepare};

use crate::common::{self, FakeConverter, SAMPLE_BIB, SAMPLE_LATEX};

const PANDOC_OUTPUT: &str = "# Palatals {#sec:palatals}\n\n\
The fricative \\[ɕ a\\] contrasts with [ʃ a][^1].\n\n\
See [the table](#tab:sibilants).\n";

#[tokio::test]
async fn test_prepare_withFakeConverter_shouldWriteAllOutputs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::config_in(temp_dir.path());
    common::create_test_file(&config.paths.raw_dir, "modele.tex", SAMPLE_LATEX).unwrap();
    common::create_test_file(&config.paths.raw_dir, "biblio.bib", SAMPLE_BIB).unwrap();

    let converter = FakeConverter::new(PANDOC_OUTPUT);
    let outputs = prepare(&config, &converter).await.unwrap();

    let cleaned = fs::read_to_string(&outputs.cleaned_latex).unwrap();
    assert!(!cleaned.contains("\\textipa"));
    assert!(cleaned.contains("[pʰ a]"));
    assert!(config.paths.raw_dir.join("cleaned_ipa.tex").is_file());

    assert_eq!(fs::read_to_string(&outputs.markdown).unwrap(), PANDOC_OUTPUT);
    assert_eq!(
        fs::read(&outputs.bibliography).unwrap(),
        fs::read(config.paths.raw_bibliography_path()).unwrap()
    );

    let requests = converter.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].input_file, "cleaned_ipa.tex");
    assert_eq!(requests[0].bibliography, "biblio.bib");
    assert_eq!(requests[0].working_dir, config.paths.raw_dir);
    assert!(requests[0].output.is_absolute());
}

#[tokio::test]
async fn test_prepare_withMissingLatex_shouldFailBeforeConverting() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::config_in(temp_dir.path());
    common::create_test_file(&config.paths.raw_dir, "biblio.bib", SAMPLE_BIB).unwrap();

    let converter = FakeConverter::new(PANDOC_OUTPUT);
    let result = prepare(&config, &converter).await;

    assert!(result.is_err());
    assert!(converter.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_prepareThenClean_shouldProduceNoiseFreeCorpus() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::config_in(temp_dir.path());
    common::create_test_file(&config.paths.raw_dir, "modele.tex", SAMPLE_LATEX).unwrap();
    common::create_test_file(&config.paths.raw_dir, "biblio.bib", SAMPLE_BIB).unwrap();

    prepare(&config, &FakeConverter::new(PANDOC_OUTPUT)).await.unwrap();
    let outputs = clean(&config).unwrap();

    let corpus = fs::read_to_string(&outputs.markdown).unwrap();
    assert_eq!(
        corpus,
        "# Palatals \n\nThe fricative \\[ɕ a\\] contrasts with [ʃ a].\n\nSee .\n"
    );

    let inventory = fs::read_to_string(&outputs.inventory).unwrap();
    assert!(inventory.contains("{#sec:palatals}"));
    assert!(inventory.contains("[^1]"));
    assert_eq!(outputs.removed, 4);
}

#[test]
fn test_clean_withoutPreparedMarkdown_shouldNamePrepareCommand() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::config_in(temp_dir.path());

    let err = clean(&config).unwrap_err();
    assert!(err.to_string().contains("thesisrag prepare"));
}

#[tokio::test]
async fn test_pandocConverter_withMissingBinary_shouldReportBinaryNotFound() {
    let temp_dir = common::create_temp_dir().unwrap();
    let converter = PandocConverter::new("definitely-not-pandoc-binary", 5);
    let request = ConversionRequest {
        working_dir: temp_dir.path().to_path_buf(),
        input_file: "in.tex".to_string(),
        bibliography: "biblio.bib".to_string(),
        output: temp_dir.path().join("out.md"),
    };

    let result = converter.convert(&request).await;
    assert!(matches!(result, Err(ConversionError::BinaryNotFound(_))));
}
