use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{LanguageDetector, TranslationProvider};

/// Client for the public Google Translate endpoint (`translate_a/single`)
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. `https://translate.googleapis.com`
    endpoint: String,
    /// Target language code
    target_language: String,
}

/// Translation plus the language Google detected for the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleTranslation {
    pub text: String,
    pub detected_language: Option<String>,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, target_language: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            target_language: target_language.into(),
        }
    }

    fn request_url(&self, text: &str) -> Result<Url, ProviderError> {
        let base = format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target_language.as_str()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid Google endpoint {}: {}", base, e)))
    }

    /// Translate one text and report the detected source language
    pub async fn translate_one(&self, text: &str) -> Result<GoogleTranslation, ProviderError> {
        if text.trim().is_empty() {
            return Ok(GoogleTranslation {
                text: text.to_string(),
                detected_language: None,
            });
        }

        let url = self.request_url(text)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        Self::parse_response(&body)
    }

    /// Extract the translation from a `translate_a/single` response.
    ///
    /// The payload is positional: `[[["<translated>", "<original>", ...], ...], null, "<detected>", ...]`.
    /// Long inputs come back split into several sentences that are concatenated.
    pub fn parse_response(body: &Value) -> Result<GoogleTranslation, ProviderError> {
        let sentences = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("missing sentence list".to_string()))?;

        let text: String = sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .collect();

        let detected_language = body.get(2).and_then(Value::as_str).map(str::to_string);

        Ok(GoogleTranslation {
            text,
            detected_language,
        })
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslate {
    fn name(&self) -> &str {
        "Google"
    }

    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        debug!("Google: translating {} texts into {}", texts.len(), self.target_language);
        let mut translated = Vec::with_capacity(texts.len());
        for text in texts {
            translated.push(self.translate_one(text).await?.text);
        }
        Ok(translated)
    }
}

#[async_trait]
impl LanguageDetector for GoogleTranslate {
    async fn detect(&self, text: &str) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::DetectionFailed("empty text".to_string()));
        }
        self.translate_one(text)
            .await?
            .detected_language
            .ok_or_else(|| ProviderError::DetectionFailed(format!("no language reported for \"{}\"", text)))
    }
}
