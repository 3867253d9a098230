/*!
 * Batch translation processing.
 *
 * Translatable fields are split into fixed-size batches that run concurrently
 * against the primary provider. Items the primary provider cannot translate
 * are queued per batch and handed to the fallback path. Outcomes are
 * reassembled by position, whatever order the batches finish in.
 */

use futures::stream::{self, StreamExt};
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::epg::{TranslatableField, TranslationOutcome};
use crate::providers::TranslationProvider;

use super::fallback::FallbackTranslator;

/// Batch translator for processing translatable fields in batches
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// First-choice provider
    primary: Arc<dyn TranslationProvider>,

    /// Fallback path, if a fallback provider is configured
    fallback: Option<FallbackTranslator>,

    /// Fields per primary call
    batch_size: usize,

    /// Maximum number of batches in flight
    max_workers: usize,
}

/// An item waiting for the fallback provider: position in its batch and trimmed text
type QueuedItem = (usize, String);

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(primary: Arc<dyn TranslationProvider>, batch_size: usize, max_workers: usize) -> Self {
        Self {
            primary,
            fallback: None,
            batch_size: batch_size.max(1),
            max_workers: max_workers.max(1),
        }
    }

    /// Attach the fallback path
    pub fn with_fallback(mut self, fallback: FallbackTranslator) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Translate fields, returning one outcome per field in the same order
    pub async fn translate_fields(&self, fields: &[TranslatableField], use_fallback: bool) -> Vec<TranslationOutcome> {
        self.translate_fields_with_progress(fields, use_fallback, |_, _| {}).await
    }

    /// Same as `translate_fields`, reporting `(completed, total)` batches as they finish
    pub async fn translate_fields_with_progress(
        &self,
        fields: &[TranslatableField],
        use_fallback: bool,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> Vec<TranslationOutcome> {
        if fields.is_empty() {
            return Vec::new();
        }

        let total_batches = fields.len().div_ceil(self.batch_size);
        let completed_batches = AtomicUsize::new(0);
        info!(
            "Starting batch translation: {} fields in {} batches with {} workers",
            fields.len(), total_batches, self.max_workers
        );

        let results: Vec<(usize, Vec<TranslationOutcome>)> = stream::iter(fields.chunks(self.batch_size).enumerate())
            .map(|(batch_index, batch)| {
                let completed_batches = &completed_batches;
                let progress_callback = &progress_callback;
                async move {
                    let start_time = Instant::now();
                    let outcomes = self
                        .translate_batch(batch, batch_index + 1, total_batches, use_fallback)
                        .await;

                    let current = completed_batches.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_batches);
                    info!(
                        "Finished batch {}/{} in {:?} ({}/{} batches done)",
                        batch_index + 1, total_batches, start_time.elapsed(), current, total_batches
                    );

                    (batch_index * self.batch_size, outcomes)
                }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        // Each batch owns the slots starting at its offset
        let mut outcomes = vec![TranslationOutcome::Unchanged; fields.len()];
        for (offset, batch_outcomes) in results {
            for (slot, outcome) in outcomes[offset..].iter_mut().zip(batch_outcomes) {
                *slot = outcome;
            }
        }

        outcomes
    }

    /// Primary pass over one batch, then the fallback pass for what it left
    async fn translate_batch(
        &self,
        batch: &[TranslatableField],
        batch_number: usize,
        total_batches: usize,
        use_fallback: bool,
    ) -> Vec<TranslationOutcome> {
        info!(
            "Starting {} batch {}/{} with {} items",
            self.primary.name(), batch_number, total_batches, batch.len()
        );

        let texts: Vec<String> = batch.iter().map(|field| field.text.trim().to_string()).collect();

        let translated: Vec<Option<String>> = match self.primary.translate_batch(&texts).await {
            Ok(results) => {
                if results.len() != texts.len() {
                    warn!(
                        "{} batch {} returned {} results for {} texts",
                        self.primary.name(), batch_number, results.len(), texts.len()
                    );
                }
                let mut results: Vec<Option<String>> = results.into_iter().map(Some).collect();
                results.resize(texts.len(), None);
                results
            }
            Err(e) => {
                error!("{} batch {} failed: {}", self.primary.name(), batch_number, e);
                vec![None; texts.len()]
            }
        };

        let mut slots: Vec<Option<TranslationOutcome>> = vec![None; texts.len()];
        let mut fallback_queue: Vec<QueuedItem> = Vec::new();

        for (index, (original, translated)) in texts.iter().zip(translated).enumerate() {
            if original.is_empty() {
                slots[index] = Some(TranslationOutcome::Unchanged);
                continue;
            }

            match translated.as_deref().map(str::trim) {
                Some(result) if !result.is_empty() && result != original => {
                    slots[index] = Some(TranslationOutcome::bilingual(result, original));
                }
                result => {
                    if result.is_none_or(str::is_empty) {
                        warn!("{} returned nothing for text: \"{}\"", self.primary.name(), original);
                    }
                    fallback_queue.push((index, original.clone()));
                }
            }
        }

        if !fallback_queue.is_empty() {
            info!(
                "{} items queued for fallback after {} batch {}",
                fallback_queue.len(), self.primary.name(), batch_number
            );
            self.flush_fallback_queue(fallback_queue, &mut slots, use_fallback).await;
        }

        slots.into_iter().map(Option::unwrap_or_default).collect()
    }

    /// Resolve queued items; items whose fallback chunk failed keep no outcome
    async fn flush_fallback_queue(
        &self,
        queue: Vec<QueuedItem>,
        slots: &mut [Option<TranslationOutcome>],
        use_fallback: bool,
    ) {
        if !use_fallback {
            warn!("Fallback is disabled. Marking {} items with their original text.", queue.len());
            for (index, original) in queue {
                slots[index] = Some(TranslationOutcome::bilingual(&original, &original));
            }
            return;
        }

        let Some(fallback) = &self.fallback else {
            warn!(
                "Fallback is enabled but no fallback provider is configured; {} items stay unchanged",
                queue.len()
            );
            return;
        };

        let texts: Vec<String> = queue.iter().map(|(_, text)| text.clone()).collect();
        let translations = fallback.translate(&texts).await;

        for ((index, original), translation) in queue.into_iter().zip(translations) {
            let Some(translation) = translation else {
                continue;
            };
            let translation = translation.trim();
            slots[index] = Some(if !translation.is_empty() && translation != original {
                TranslationOutcome::bilingual(translation, &original)
            } else {
                TranslationOutcome::Unchanged
            });
        }
    }
}
