/*!
 * Common test utilities for the epg-translator test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use std::sync::Arc;
use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use epg_translator::epg::TimeWindow;
use epg_translator::providers::MockProvider;
use epg_translator::translation::{RetryPolicy, TranslationOptions, TranslationService};

/// Route library logs through env_logger; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// The instant every time-dependent test runs at
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid test date")
}

/// Window starting at `fixed_now()`
pub fn fixed_window() -> TimeWindow {
    TimeWindow::starting_at(fixed_now())
}

/// XMLTV timestamp `offset` away from `fixed_now()`
pub fn epg_time(offset: Duration) -> String {
    format!("{} +0000", (fixed_now() + offset).format("%Y%m%d%H%M%S"))
}

/// A `<programme>` element
pub fn programme(channel: &str, start: &str, stop: &str, title: &str, desc: &str) -> String {
    format!(
        "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n    <title>{}</title>\n    <desc>{}</desc>\n  </programme>\n",
        start, stop, channel, title, desc
    )
}

/// A `<channel>` element
pub fn channel(id: &str, display_name: &str) -> String {
    format!(
        "  <channel id=\"{}\">\n    <display-name>{}</display-name>\n  </channel>\n",
        id, display_name
    )
}

/// Wrap elements into a complete XMLTV document
pub fn guide(body: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n<tv generator-info-name=\"test\">\n{}</tv>\n",
        body.concat()
    )
}

/// Two channels, each with one running and one finished programme
pub fn sample_guide() -> String {
    let hour = Duration::hours(1);
    guide(&[
        channel("ch1", "Erstes"),
        channel("ch2", "Zweites"),
        programme("ch1", &epg_time(-hour * 2), &epg_time(-hour), "Vorbei", "Schon gelaufen"),
        programme("ch1", &epg_time(-hour), &epg_time(hour), "Nachrichten", "Der Tag im Überblick"),
        programme("ch2", &epg_time(Duration::zero()), &epg_time(hour * 2), "Krimi", "Ein spannender Fall"),
    ])
}

/// Translation options for tests: small batches, no backoff
pub fn test_options(batch_size: usize, workers: usize, enable_fallback: bool) -> TranslationOptions {
    TranslationOptions {
        target_language: "en".to_string(),
        skip_languages: vec!["en".to_string(), "fr".to_string()],
        batch_size,
        fallback_batch_size: 2,
        workers,
        enable_fallback,
        retry: RetryPolicy::new(5, std::time::Duration::from_millis(1)),
    }
}

/// Service over mock providers
pub fn mock_service(
    options: TranslationOptions,
    primary: MockProvider,
    fallback: Option<MockProvider>,
) -> TranslationService {
    let service = TranslationService::new(options, Arc::new(primary));
    match fallback {
        Some(fallback) => service.with_fallback(Arc::new(fallback)),
        None => service,
    }
}
