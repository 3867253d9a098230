/*!
 * Tests for provider implementations and the single-text translation path
 */

use std::sync::Arc;
use serde_json::json;
use epg_translator::providers::mock::MockDetector;
use epg_translator::providers::{GoogleTranslate, MockProvider, OpenAi};
use epg_translator::errors::ProviderError;
use crate::common::{mock_service, test_options};

/// Test that multi-sentence Google responses are concatenated
#[test]
fn test_googleParseResponse_withSentences_shouldConcatenate() {
    let body = json!([
        [["Good evening. ", "Guten Abend. ", null], ["Here is the news.", "Hier sind die Nachrichten.", null]],
        null,
        "de"
    ]);

    let parsed = GoogleTranslate::parse_response(&body).unwrap();

    assert_eq!(parsed.text, "Good evening. Here is the news.");
    assert_eq!(parsed.detected_language.as_deref(), Some("de"));
}

/// Test that a Google response without sentences is a parse error
#[test]
fn test_googleParseResponse_withUnexpectedShape_shouldFail() {
    let result = GoogleTranslate::parse_response(&json!({"error": "nope"}));

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

/// Test the OpenAI request prompt
#[test]
fn test_openAiBuildRequest_shouldContainPromptAndModel() {
    let client = OpenAi::new("key", "https://api.openai.com/v1", "gpt-3.5-turbo", "en", 60);

    let request = serde_json::to_value(client.build_request("Wetterbericht")).unwrap();

    assert_eq!(request["model"], "gpt-3.5-turbo");
    assert_eq!(request["messages"][0]["role"], "user");
    assert_eq!(
        request["messages"][0]["content"],
        "Translate the text below into en.\n\nText: Wetterbericht"
    );
}

/// Test that a text in a skipped language is returned unchanged
#[tokio::test]
async fn test_translateText_withSkippedLanguage_shouldReturnOriginal() {
    let primary = MockProvider::working();
    let service = mock_service(test_options(10, 1, false), primary.clone(), None)
        .with_detector(Arc::new(MockDetector::detecting("fr")));

    assert_eq!(service.translate_text("Bonjour").await, "Bonjour");
    assert_eq!(primary.request_count(), 0);
}

/// Test that a detection failure does not prevent translation
#[test]
fn test_translateText_withDetectionFailure_shouldTranslate() {
    let service = mock_service(test_options(10, 1, false), MockProvider::working(), None)
        .with_detector(Arc::new(MockDetector::failing()));

    let translated = tokio_test::block_on(service.translate_text("Hallo"));

    assert_eq!(translated, "EN: Hallo");
}

/// Test that the fallback provider is used when the primary echoes
#[tokio::test]
async fn test_translateText_withEchoPrimaryAndFallback_shouldUseFallback() {
    let service = mock_service(test_options(10, 1, true), MockProvider::echo(), Some(MockProvider::working()))
        .with_detector(Arc::new(MockDetector::detecting("de")));

    assert_eq!(service.translate_text("Hallo").await, "EN: Hallo");
}

/// Test that the original is returned when nothing translates and fallback is off
#[tokio::test]
async fn test_translateText_withFailingPrimaryAndNoFallback_shouldReturnOriginal() {
    let fallback = MockProvider::working();
    let service = mock_service(test_options(10, 1, false), MockProvider::failing(), Some(fallback.clone()));

    assert_eq!(service.translate_text("Hallo").await, "Hallo");
    assert_eq!(fallback.request_count(), 0);
}
