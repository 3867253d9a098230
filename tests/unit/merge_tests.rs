/*!
 * Tests for merging translations back into a guide
 */

use std::collections::BTreeSet;
use chrono::Duration;
use epg_translator::epg::{filter_document, merge_outcomes, EpgDocument, TranslationOutcome};
use crate::common::{self, channel, epg_time, fixed_window, guide, programme};

/// Test that an untouched guide serializes byte for byte
#[test]
fn test_mergeOutcomes_withNoChanges_shouldPreserveInput() {
    let xml = guide(&[
        channel("ch1", "Eins"),
        programme("ch1", &epg_time(Duration::zero()), &epg_time(Duration::hours(1)), "A", "B"),
    ]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();
    let outcomes = vec![TranslationOutcome::Unchanged; fields.len()];

    let merged = merge_outcomes(&document, &fields, &outcomes);

    assert_eq!(merged.xml, xml);
    assert_eq!(merged.rewritten, 0);
}

/// Test that pruned elements disappear along with their trailing whitespace
#[test]
fn test_mergeOutcomes_shouldRemovePrunedElements() {
    let xml = common::sample_guide();
    let allow_list: BTreeSet<String> = ["ch1".to_string()].into_iter().collect();
    let (document, fields) = filter_document(&xml, Some(&allow_list), "test", &fixed_window()).unwrap();
    let outcomes = vec![TranslationOutcome::Unchanged; fields.len()];

    let merged = merge_outcomes(&document, &fields, &outcomes);

    assert!(!merged.xml.contains("ch2"));
    assert!(!merged.xml.contains("Vorbei"));
    assert!(merged.xml.contains("<title>Nachrichten</title>"));
    assert!(!merged.xml.contains("\n\n"));
    assert!(merged.xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE tv"));
    EpgDocument::parse(&merged.xml).unwrap();
}

/// Test that rewritten text replaces the original and is escaped
#[test]
fn test_mergeOutcomes_withRewrittenText_shouldReplaceAndEscape() {
    let xml = guide(&[channel("c", "Tom &amp; Jerry")]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(
        &document,
        &fields,
        &[TranslationOutcome::bilingual("Tom <and> Jerry", "Tom & Jerry")],
    );

    assert!(merged.xml.contains("<display-name>Tom &lt;and&gt; Jerry / Tom &amp; Jerry</display-name>"));
    assert_eq!(merged.rewritten, 1);
}

/// Test that merging an already merged value is a no-op
#[test]
fn test_mergeOutcomes_twice_shouldNotAppendAgain() {
    let xml = guide(&[channel("c", "Kanal")]);
    let outcome = TranslationOutcome::Rewritten("Kanal / Kanal".to_string());

    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();
    let first = merge_outcomes(&document, &fields, std::slice::from_ref(&outcome));

    let (document, fields) = filter_document(&first.xml, None, "test", &fixed_window()).unwrap();
    let second = merge_outcomes(&document, &fields, std::slice::from_ref(&outcome));

    assert!(first.xml.contains("<display-name>Kanal / Kanal</display-name>"));
    assert_eq!(second.xml, first.xml);
    assert_eq!(second.rewritten, 0);
}

/// Test that whitespace differences alone do not count as a rewrite
#[test]
fn test_mergeOutcomes_withOnlyWhitespaceDifference_shouldKeepText() {
    let xml = guide(&[channel("c", " Kanal ")]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(&document, &fields, &[TranslationOutcome::Rewritten("Kanal".to_string())]);

    assert_eq!(merged.xml, xml);
}

/// Test that fields without a text node are left alone
#[test]
fn test_mergeOutcomes_withEmptyElement_shouldSkipField() {
    let xml = guide(&["  <channel id=\"c\">\n    <display-name/>\n  </channel>\n".to_string()]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(&document, &fields, &[TranslationOutcome::Rewritten("X".to_string())]);

    assert_eq!(merged.xml, xml);
    assert_eq!(merged.rewritten, 0);
}

/// Test that text mixed with CDATA is replaced as a whole
#[test]
fn test_mergeOutcomes_withCdataSection_shouldReplaceWholeText() {
    let xml = guide(&[channel("c", "Vor<![CDATA[ & ]]>Nach")]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(&document, &fields, &[TranslationOutcome::bilingual("X", &fields[0].text)]);

    assert!(merged.xml.contains("<display-name>X / Vor &amp; Nach</display-name>"));
    assert!(!merged.xml.contains("CDATA"));
    assert_eq!(merged.rewritten, 1);
    EpgDocument::parse(&merged.xml).unwrap();
}

/// Test that a comment before the text is replaced along with it
#[test]
fn test_mergeOutcomes_withLeadingComment_shouldRewriteText() {
    let xml = guide(&[channel("c", "<!-- c -->Zweites")]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(&document, &fields, &[TranslationOutcome::bilingual("Second", "Zweites")]);

    assert!(merged.xml.contains("<display-name>Second / Zweites</display-name>"));
    assert_eq!(merged.rewritten, 1);
}

/// Test that a field holding only a comment is left alone
#[test]
fn test_mergeOutcomes_withOnlyComment_shouldSkipField() {
    let xml = guide(&[channel("c", "<!-- leer -->")]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(&document, &fields, &[TranslationOutcome::Rewritten("X".to_string())]);

    assert_eq!(merged.xml, xml);
    assert_eq!(merged.rewritten, 0);
}

/// Test that attribute order and formatting survive the merge
#[test]
fn test_mergeOutcomes_shouldKeepAttributesVerbatim() {
    let xml = guide(&[
        "  <channel   id='c'  lang=\"de\">\n    <display-name lang=\"de\">Eins</display-name>\n  </channel>\n".to_string(),
    ]);
    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let merged = merge_outcomes(&document, &fields, &[TranslationOutcome::bilingual("One", "Eins")]);

    assert!(merged.xml.contains("<channel   id='c'  lang=\"de\">"));
    assert!(merged.xml.contains("<display-name lang=\"de\">One / Eins</display-name>"));
}
