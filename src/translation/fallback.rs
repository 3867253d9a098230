/*!
 * Fallback translation with retry and backoff.
 *
 * Texts the primary provider could not translate are re-sent to the fallback
 * provider in smaller chunks. Each chunk is retried on failure, waiting
 * `2 * attempt` backoff units between attempts.
 */

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::providers::TranslationProvider;

/// How often and how patiently a fallback chunk is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per chunk, including the first one
    pub max_attempts: u32,
    /// Backoff unit; the wait after failed attempt `n` is `2 * n` units
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    /// Wait before the attempt following failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_unit * (2 * attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Sends queued texts to the fallback provider
#[derive(Debug, Clone)]
pub struct FallbackTranslator {
    provider: Arc<dyn TranslationProvider>,
    chunk_size: usize,
    policy: RetryPolicy,
}

impl FallbackTranslator {
    pub fn new(provider: Arc<dyn TranslationProvider>, chunk_size: usize, policy: RetryPolicy) -> Self {
        Self {
            provider,
            chunk_size: chunk_size.max(1),
            policy,
        }
    }

    /// Translate `texts` chunk by chunk.
    ///
    /// Returns one entry per input. An entry is `None` when its chunk failed
    /// every attempt or the provider returned fewer results than it was given.
    pub async fn translate(&self, texts: &[String]) -> Vec<Option<String>> {
        info!("{} fallback processing {} items...", self.provider.name(), texts.len());

        let total_chunks = texts.len().div_ceil(self.chunk_size);
        let mut results = Vec::with_capacity(texts.len());

        for (chunk_index, chunk) in texts.chunks(self.chunk_size).enumerate() {
            match self.translate_chunk_with_retry(chunk, chunk_index + 1, total_chunks).await {
                Some(translated) => {
                    let mut translated: Vec<Option<String>> = translated.into_iter().map(Some).collect();
                    translated.resize(chunk.len(), None);
                    results.extend(translated);
                }
                None => results.extend((0..chunk.len()).map(|_| None)),
            }
        }

        results
    }

    async fn translate_chunk_with_retry(
        &self,
        chunk: &[String],
        chunk_number: usize,
        total_chunks: usize,
    ) -> Option<Vec<String>> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            debug!(
                "{} fallback attempt {}/{} (chunk {}/{})",
                self.provider.name(), attempt, max_attempts, chunk_number, total_chunks
            );

            match self.provider.translate_batch(chunk).await {
                Ok(translated) => {
                    if translated.len() != chunk.len() {
                        warn!(
                            "{} returned {} results for {} texts",
                            self.provider.name(), translated.len(), chunk.len()
                        );
                    }
                    return Some(translated);
                }
                Err(e) => {
                    error!(
                        "{} fallback failed (attempt {}/{}): {}",
                        self.provider.name(), attempt, max_attempts, e
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        warn!(
            "Max retries reached for fallback chunk {}/{}; {} items stay untranslated",
            chunk_number, total_chunks, chunk.len()
        );
        None
    }
}
