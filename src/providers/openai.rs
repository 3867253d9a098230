use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// OpenAI client translating through chat completions
#[derive(Debug, Clone)]
pub struct OpenAi {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Chat model
    model: String,
    /// Target language code
    target_language: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Completion choices
    pub choices: Vec<ChatChoice>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

impl OpenAi {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        target_language: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            target_language: target_language.into(),
        }
    }

    /// Build the request asking for a translation of `text`
    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Translate the text below into {}.\n\nText: {}",
                    self.target_language, text
                ),
            }],
        }
    }

    /// Translate a single text with one chat completion
    async fn complete(&self, text: &str) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if self.api_key.is_empty() {
            return Err(ProviderError::AuthenticationError("OpenAI API key is not set".to_string()));
        }

        let api_url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let response = self.client.post(&api_url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, message);
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthenticationError(message),
                code => ProviderError::ApiError { status_code: code, message },
            });
        }

        let chat: ChatResponse = response.json().await?;
        Self::extract_text(&chat)
    }

    /// Extract the translation from a chat response
    pub fn extract_text(response: &ChatResponse) -> Result<String, ProviderError> {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::ParseError("response has no choices".to_string()))
    }
}

#[async_trait]
impl TranslationProvider for OpenAi {
    fn name(&self) -> &str {
        "ChatGPT"
    }

    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        debug!("ChatGPT: translating {} texts with {}", texts.len(), self.model);
        let mut translated = Vec::with_capacity(texts.len());
        for text in texts {
            translated.push(self.complete(text).await?);
        }
        Ok(translated)
    }
}
