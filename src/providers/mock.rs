/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::echo()` - Succeeds but returns the input unchanged
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::fail_first(n)` - Fails the first n calls, then works
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{LanguageDetector, TranslationProvider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// Always succeeds with `EN: <text>`
    Working,
    /// Returns every text unchanged
    Echo,
    /// Returns an empty string for every text
    Empty,
    /// Always fails with an error
    Failing,
    /// Fails the first `failures` calls, then behaves like `Working`
    FailFirst { failures: usize },
    /// Drops the last translation of every batch
    Short,
    /// Like `Working`, but the first call sleeps before answering
    SlowFirst { delay_ms: u64 },
    /// Applies a custom function to every text
    Custom(fn(&str) -> String),
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every batch received, in call order
    received: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    pub fn custom(translate: fn(&str) -> String) -> Self {
        Self::new(MockBehavior::Custom(translate))
    }

    /// Number of `translate_batch` calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Batches received so far, in call order
    pub fn received_batches(&self) -> Vec<Vec<String>> {
        self.received
            .lock()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }

    /// The translation `Working` produces
    pub fn working_translation(text: &str) -> String {
        format!("EN: {}", text)
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(texts.to_vec());
        }

        let working = || -> Vec<String> {
            texts.iter().map(|t| Self::working_translation(t)).collect()
        };

        match self.behavior {
            MockBehavior::Working => Ok(working()),
            MockBehavior::Echo => Ok(texts.to_vec()),
            MockBehavior::Empty => Ok(vec![String::new(); texts.len()]),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(working())
                }
            }
            MockBehavior::Short => {
                let mut translated = working();
                translated.pop();
                Ok(translated)
            }
            MockBehavior::SlowFirst { delay_ms } => {
                if count == 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Ok(working())
            }
            MockBehavior::Custom(translate) => Ok(texts.iter().map(|t| translate(t)).collect()),
        }
    }
}

/// Language detector returning a fixed answer
#[derive(Debug, Clone)]
pub struct MockDetector {
    language: Option<String>,
}

impl MockDetector {
    /// Detector that always reports `language`
    pub fn detecting(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
        }
    }

    /// Detector that always fails
    pub fn failing() -> Self {
        Self { language: None }
    }
}

#[async_trait]
impl LanguageDetector for MockDetector {
    async fn detect(&self, _text: &str) -> Result<String, ProviderError> {
        self.language
            .clone()
            .ok_or_else(|| ProviderError::DetectionFailed("Simulated detection failure".to_string()))
    }
}
