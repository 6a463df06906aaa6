/*!
 * Tests for conversion noise removal
 */

use thesisrag::noise::{NoiseCategory, NoiseFilter, NoiseInventory};

const NOISY: &str = "# Introduction {#sec:intro}\n\
See [Chapter 2](#ch2) for details.\n\
![Vowel chart](img/vowels.png){width=\"60%\"}\n\
$$F_1 = 500$$\n\
Most speakers agree[^4].\n";

#[test]
fn test_clean_withTypicalPandocOutput_shouldStripNoiseOnly() {
    let report = NoiseFilter::clean(NOISY);

    assert_eq!(
        report.cleaned,
        "# Introduction \nSee  for details.\n\n\nMost speakers agree.\n"
    );
    assert_eq!(report.inventory.footnotes, vec!["[^4]"]);
    assert_eq!(report.inventory.dollar_blocks, vec!["$$F_1 = 500$$"]);
}

#[test]
fn test_clean_withoutNoise_shouldReturnInputUnchanged() {
    let text = "Plain paragraph with ʂ and ɕ.\n\nAnother one.";
    let report = NoiseFilter::clean(text);
    assert_eq!(report.cleaned, text);
    assert!(report.inventory.is_empty());
}

#[test]
fn test_remove_withEditedInventory_shouldOnlyRemoveListedEntries() {
    let mut inventory = NoiseFilter::extract(NOISY);
    inventory.footnotes.clear();

    let cleaned = NoiseFilter::remove(NOISY, &inventory);
    assert!(cleaned.contains("agree[^4]."));
    assert!(!cleaned.contains("{#sec:intro}"));
}

#[test]
fn test_inventory_shouldRoundTripThroughJson() {
    let inventory = NoiseFilter::extract(NOISY);
    let json = serde_json::to_string_pretty(&inventory).unwrap();
    for category in NoiseCategory::ALL {
        assert!(json.contains(category.name()));
    }
    let parsed: NoiseInventory = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, inventory);
}
