/*!
 * Tests for guide parsing, pruning and field enumeration
 */

use std::collections::BTreeSet;
use chrono::Duration;
use epg_translator::epg::{filter_document, EpgDocument, ParentKind, TimeWindow};
use epg_translator::errors::EpgError;
use crate::common::{self, channel, epg_time, fixed_window, guide, programme};

fn allow(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn single_programme_guide(stop: &str) -> String {
    guide(&[
        channel("ch1", "Eins"),
        programme("ch1", &epg_time(-Duration::hours(1)), stop, "Titel", "Beschreibung"),
    ])
}

/// Test that a programme that just ended is removed
#[test]
fn test_prune_withFinishedProgramme_shouldRemove() {
    let xml = single_programme_guide(&epg_time(-Duration::seconds(1)));
    let mut document = EpgDocument::parse(&xml).unwrap();

    let stats = document.prune(None, &fixed_window());

    assert_eq!(stats.programmes_removed, 1);
    assert_eq!(document.programme_count(), 0);
}

/// Test that a programme ending inside the horizon is kept
#[test]
fn test_prune_withStopInsideHorizon_shouldKeep() {
    let xml = single_programme_guide(&epg_time(Duration::hours(47)));
    let mut document = EpgDocument::parse(&xml).unwrap();

    document.prune(None, &fixed_window());

    assert_eq!(document.programme_count(), 1);
}

/// Test that the horizon itself is still inside the window
#[test]
fn test_prune_withStopExactlyAtHorizon_shouldKeep() {
    let xml = single_programme_guide(&epg_time(Duration::days(2)));
    let mut document = EpgDocument::parse(&xml).unwrap();

    document.prune(None, &fixed_window());

    assert_eq!(document.programme_count(), 1);
}

/// Test that a programme ending past the horizon is removed
#[test]
fn test_prune_withStopPastHorizon_shouldRemove() {
    for hours in [49, 73] {
        let xml = single_programme_guide(&epg_time(Duration::hours(hours)));
        let mut document = EpgDocument::parse(&xml).unwrap();

        document.prune(None, &fixed_window());

        assert_eq!(document.programme_count(), 0, "stop at +{}h", hours);
    }
}

/// Test that unparsable or missing stop times remove the programme
#[test]
fn test_prune_withUnparsableStop_shouldRemove() {
    for stop in ["tomorrow", "2024", ""] {
        let xml = single_programme_guide(stop);
        let mut document = EpgDocument::parse(&xml).unwrap();

        document.prune(None, &fixed_window());

        assert_eq!(document.programme_count(), 0, "stop {:?}", stop);
    }
}

/// Test that channel filtering drops other channels and their programmes
#[test]
fn test_filterDocument_withAllowList_shouldDropForeignChannels() {
    let xml = common::sample_guide();
    let allow_list = allow(&["ch1"]);

    let (document, fields) = filter_document(&xml, Some(&allow_list), "test", &fixed_window()).unwrap();

    assert_eq!(document.channel_ids(), vec!["ch1"]);
    assert_eq!(document.programme_count(), 1);
    let texts: Vec<&str> = fields.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["Erstes", "Nachrichten", "Der Tag im Überblick"]);
}

/// Test that without an allow-list every channel survives
#[test]
fn test_filterDocument_withoutAllowList_shouldKeepAllChannels() {
    let xml = common::sample_guide();

    let (document, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    assert_eq!(document.channel_ids(), vec!["ch1", "ch2"]);
    assert_eq!(document.programme_count(), 2);
    assert_eq!(fields.len(), 6);
}

/// Test that channels missing from the guide do not prevent filtering
#[test]
fn test_filterDocument_withUnknownChannels_shouldReportCoverage() {
    let xml = common::sample_guide();
    let document = EpgDocument::parse(&xml).unwrap();

    let coverage = document.channel_coverage(&allow(&["ch2", "ch9"]));

    assert_eq!(coverage.matched, allow(&["ch2"]));
    assert_eq!(coverage.missing, allow(&["ch9"]));
}

/// Test that only whitelisted tags are enumerated, in document order
#[test]
fn test_translatableFields_shouldFollowWhitelist() {
    let hour = Duration::hours(1);
    let xml = guide(&[
        "  <channel id=\"c\">\n    <display-name>Kanal</display-name>\n    <icon src=\"x.png\"/>\n    <url>http://c</url>\n  </channel>\n".to_string(),
        format!(
            "  <programme start=\"{}\" stop=\"{}\" channel=\"c\">\n    <title>T</title>\n    <sub-title>S</sub-title>\n    <desc>D</desc>\n    <category>K</category>\n    <country>L</country>\n    <episode-num>1</episode-num>\n  </programme>\n",
            epg_time(Duration::zero()),
            epg_time(hour)
        ),
    ]);

    let (_, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    let tags: Vec<(ParentKind, &str)> = fields.iter().map(|f| (f.parent, f.tag.as_str())).collect();
    assert_eq!(
        tags,
        vec![
            (ParentKind::Channel, "display-name"),
            (ParentKind::Programme, "title"),
            (ParentKind::Programme, "desc"),
            (ParentKind::Programme, "category"),
            (ParentKind::Programme, "country"),
        ]
    );
}

/// Test that a field without text is enumerated with empty text
#[test]
fn test_translatableFields_withEmptyElement_shouldYieldEmptyText() {
    let xml = guide(&[
        "  <channel id=\"c\">\n    <display-name/>\n  </channel>\n".to_string(),
    ]);

    let (_, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].text, "");
}

/// Test that entities are unescaped in field text
#[test]
fn test_translatableFields_withEntities_shouldUnescape() {
    let xml = guide(&[channel("c", "Tom &amp; Jerry")]);

    let (_, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    assert_eq!(fields[0].text, "Tom & Jerry");
}

/// Test that text split by a CDATA section is read as one value
#[test]
fn test_translatableFields_withCdataSection_shouldJoinText() {
    let xml = guide(&[channel("c", "Vor<![CDATA[ & ]]>Nach")]);

    let (_, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    assert_eq!(fields[0].text, "Vor & Nach");
}

/// Test that a leading comment does not hide the text after it
#[test]
fn test_translatableFields_withLeadingComment_shouldSkipComment() {
    let xml = guide(&[
        channel("a", "<!-- c -->Zweites"),
        channel("b", "<!-- nur Kommentar -->"),
    ]);

    let (_, fields) = filter_document(&xml, None, "test", &fixed_window()).unwrap();

    assert_eq!(fields[0].text, "Zweites");
    assert_eq!(fields[1].text, "");
}

/// Test that a malformed guide is reported as such
#[test]
fn test_filterDocument_withMalformedXml_shouldFail() {
    let result = filter_document("<tv><channel id=\"a\"></tv>", None, "broken", &fixed_window());

    assert!(matches!(result, Err(EpgError::MalformedDocument(_))));
}

/// Test that the window boundaries follow the given instant
#[test]
fn test_timeWindow_shouldSpanTwoDays() {
    let window = TimeWindow::starting_at(common::fixed_now());

    assert_eq!(window.horizon() - window.now(), Duration::days(2));
    assert!(!window.keeps_stop(Some(&epg_time(Duration::zero()))));
    assert!(window.keeps_stop(Some(&epg_time(Duration::seconds(1)))));
    assert!(!window.keeps_stop(None));
    assert!(window.translates_start(Some(&epg_time(-Duration::hours(5)))));
    assert!(!window.translates_start(Some(&epg_time(Duration::days(3)))));
}
