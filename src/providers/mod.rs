/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the translation backends:
 * - Google: public Google Translate endpoint, also used for language detection
 * - OpenAI: ChatGPT chat completions, used as the fallback provider
 * - Mock: scripted behaviors for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// A provider translates a list of texts into the configured target language
/// and returns the translations in the same order.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// Translate a batch of texts
    ///
    /// # Arguments
    /// * `texts` - The texts to translate
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input, or an error for the whole batch
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError>;

    /// Translate a single text
    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let translated = self.translate_batch(&[text.to_string()]).await?;
        if translated.len() != 1 {
            return Err(ProviderError::LengthMismatch {
                expected: 1,
                actual: translated.len(),
            });
        }
        Ok(translated.into_iter().next().unwrap_or_default())
    }
}

/// Detects the language of a text
#[async_trait]
pub trait LanguageDetector: Send + Sync + Debug {
    /// Return a language code such as `fr` or `zh-CN`
    async fn detect(&self, text: &str) -> Result<String, ProviderError>;
}

pub mod google;
pub mod mock;
pub mod openai;

pub use self::google::GoogleTranslate;
pub use self::mock::{MockBehavior, MockProvider};
pub use self::openai::OpenAi;
