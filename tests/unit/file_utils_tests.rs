/*!
 * Tests for file utility functions
 */

use std::fs;
use thesisrag::file_utils::FileManager;

use crate::common;

#[test]
fn test_writeToFile_withMissingParents_shouldCreateThem() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("a").join("b").join("out.md");

    FileManager::write_to_file(&path, "# Title\n").unwrap();

    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(temp_dir.path().join("a").join("b")));
    assert_eq!(FileManager::read_to_string(&path).unwrap(), "# Title\n");
}

#[test]
fn test_copyFile_shouldPreserveBytes() {
    let temp_dir = common::create_temp_dir().unwrap();
    let source = common::create_test_file(temp_dir.path(), "raw/biblio.bib", common::SAMPLE_BIB).unwrap();
    let target = temp_dir.path().join("final").join("biblio.bib");

    let copied = FileManager::copy_file(&source, &target).unwrap();

    assert_eq!(copied as usize, common::SAMPLE_BIB.len());
    assert_eq!(fs::read(&source).unwrap(), fs::read(&target).unwrap());
    assert_eq!(
        FileManager::sha256_hex(&source).unwrap(),
        FileManager::sha256_hex(&target).unwrap()
    );
}

#[test]
fn test_copyFile_withMissingSource_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let result = FileManager::copy_file(temp_dir.path().join("nope"), temp_dir.path().join("out"));
    assert!(result.is_err());
}

#[test]
fn test_requireFile_withMissingFile_shouldNameProducer() {
    let temp_dir = common::create_temp_dir().unwrap();
    let err = FileManager::require_file(temp_dir.path().join("main.md"), "thesisrag clean").unwrap_err();
    assert!(err.to_string().contains("thesisrag clean"));
}

#[test]
fn test_jsonRoundTrip_shouldKeepNonAsciiText() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("inventory.json");
    let value = vec!["ɕ".to_string(), "ʂ".to_string()];

    FileManager::write_json(&path, &value).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("ɕ"));

    let read: Vec<String> = FileManager::read_json(&path).unwrap();
    assert_eq!(read, value);
}

#[test]
fn test_sha256Of_withKnownInput_shouldMatchDigest() {
    assert_eq!(
        FileManager::sha256_of(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
