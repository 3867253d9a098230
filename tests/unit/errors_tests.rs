/*!
 * Tests for error types and conversions
 */

use epg_translator::errors::{AppError, EpgError, ProviderError};
use epg_translator::epg::EpgDocument;

/// Test that provider errors render their details
#[test]
fn test_providerError_display_shouldIncludeDetails() {
    let error = ProviderError::ApiError { status_code: 429, message: "Too many requests".to_string() };
    assert_eq!(error.to_string(), "API responded with error: 429 - Too many requests");

    let error = ProviderError::LengthMismatch { expected: 3, actual: 2 };
    assert_eq!(error.to_string(), "Provider returned 2 items for a batch of 3");
}

/// Test that XML parse failures become malformed document errors
#[test]
fn test_epgError_fromParseFailure_shouldBeMalformedDocument() {
    let error = EpgDocument::parse("<tv><programme></tv>").unwrap_err();

    assert!(matches!(error, EpgError::MalformedDocument(_)));
    assert!(error.to_string().starts_with("Malformed EPG document"));
}

/// Test that lower level errors convert into AppError
#[test]
fn test_appError_from_shouldWrapSources() {
    let app_error: AppError = ProviderError::ConnectionError("refused".to_string()).into();
    assert!(matches!(app_error, AppError::Provider(ProviderError::ConnectionError(_))));

    let app_error: AppError = EpgError::MalformedDocument("bad".to_string()).into();
    assert_eq!(app_error.to_string(), "EPG error: Malformed EPG document: bad");

    let app_error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app_error, AppError::File(_)));

    let app_error: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(app_error, AppError::Unknown(message) if message == "boom"));
}
