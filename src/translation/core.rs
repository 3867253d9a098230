/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which ties the EPG
 * filter, the batch translator and the merge step together, and the
 * single-text translation path used from the command line.
 */

use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, ProviderConfig, ProviderKind};
use crate::epg::{filter_document, merge_outcomes, FallbackOverride, TimeWindow};
use crate::language_utils;
use crate::providers::{GoogleTranslate, LanguageDetector, OpenAi, TranslationProvider};

use super::batch::BatchTranslator;
use super::fallback::{FallbackTranslator, RetryPolicy};

/// Translation options for customizing the translation process
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Target language code
    pub target_language: String,

    /// Detected languages that the single-text path leaves alone
    pub skip_languages: Vec<String>,

    /// Fields per primary call
    pub batch_size: usize,

    /// Fields per fallback call
    pub fallback_batch_size: usize,

    /// Batches in flight
    pub workers: usize,

    /// Process-wide fallback default, used when a source has no override
    pub enable_fallback: bool,

    /// Retry policy for fallback chunks
    pub retry: RetryPolicy,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TranslationOptions {
    /// Extract the translation settings from the application config
    pub fn from_config(config: &Config) -> Self {
        let t = &config.translation;
        Self {
            target_language: config.target_language.clone(),
            skip_languages: config.skip_languages.clone(),
            batch_size: t.batch_size,
            fallback_batch_size: t.fallback_batch_size,
            workers: t.workers,
            enable_fallback: t.enable_fallback,
            retry: RetryPolicy::new(
                t.fallback_retry_count,
                Duration::from_millis(t.fallback_backoff_ms),
            ),
        }
    }
}

/// Main translation service for EPG documents
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Translation options
    pub options: TranslationOptions,

    /// First-choice provider
    primary: Arc<dyn TranslationProvider>,

    /// Provider used when the primary one fails or leaves text unchanged
    fallback: Option<Arc<dyn TranslationProvider>>,

    /// Language detection for the single-text path
    detector: Option<Arc<dyn LanguageDetector>>,
}

fn build_provider(config: &ProviderConfig, target_language: &str) -> Option<Arc<dyn TranslationProvider>> {
    match config.provider_type {
        ProviderKind::Google => Some(Arc::new(GoogleTranslate::new(
            config.effective_endpoint(),
            target_language,
            config.timeout_secs,
        ))),
        ProviderKind::OpenAI => {
            if config.api_key.is_empty() {
                debug!("No OpenAI API key configured; provider disabled");
                return None;
            }
            Some(Arc::new(OpenAi::new(
                config.api_key.clone(),
                config.effective_endpoint(),
                config.effective_model(),
                target_language,
                config.timeout_secs,
            )))
        }
    }
}

impl TranslationService {
    /// Create a service around a primary provider
    pub fn new(options: TranslationOptions, primary: Arc<dyn TranslationProvider>) -> Self {
        Self {
            options,
            primary,
            fallback: None,
            detector: None,
        }
    }

    /// Attach a fallback provider
    pub fn with_fallback(mut self, fallback: Arc<dyn TranslationProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Attach a language detector
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Create a translation service with the given configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let options = TranslationOptions::from_config(config);
        let target = &config.target_language;
        let primary_config = &config.translation.primary;

        // Google reports the source language with every translation, so it doubles as detector
        let google = Arc::new(GoogleTranslate::new(
            if primary_config.provider_type == ProviderKind::Google {
                primary_config.effective_endpoint()
            } else {
                ProviderConfig::new(ProviderKind::Google).effective_endpoint()
            },
            target.clone(),
            primary_config.timeout_secs,
        ));

        let primary: Arc<dyn TranslationProvider> = match primary_config.provider_type {
            ProviderKind::Google => google.clone(),
            ProviderKind::OpenAI => build_provider(primary_config, target).ok_or_else(|| {
                anyhow!(
                    "Primary provider {} is not usable (missing API key?)",
                    primary_config.provider_type.display_name()
                )
            })?,
        };

        let mut service = Self::new(options, primary).with_detector(google);
        if let Some(fallback) = build_provider(&config.translation.fallback, target) {
            service = service.with_fallback(fallback);
        }
        Ok(service)
    }

    fn batch_translator(&self) -> BatchTranslator {
        let translator = BatchTranslator::new(
            self.primary.clone(),
            self.options.batch_size,
            self.options.workers,
        );
        match &self.fallback {
            Some(provider) => translator.with_fallback(FallbackTranslator::new(
                provider.clone(),
                self.options.fallback_batch_size,
                self.options.retry,
            )),
            None => translator,
        }
    }

    /// Filter and translate a guide at the current time
    pub async fn translate_document(
        &self,
        xml: &str,
        allow_list: Option<&BTreeSet<String>>,
        source: &str,
        fallback_override: FallbackOverride,
    ) -> String {
        self.translate_document_at(xml, allow_list, source, fallback_override, &TimeWindow::from_now(), |_, _| {})
            .await
    }

    /// Filter and translate a guide within a given time window.
    ///
    /// Never fails: a guide that cannot be parsed is returned unchanged.
    pub async fn translate_document_at(
        &self,
        xml: &str,
        allow_list: Option<&BTreeSet<String>>,
        source: &str,
        fallback_override: FallbackOverride,
        window: &TimeWindow,
        progress_callback: impl Fn(usize, usize) + Send + Sync,
    ) -> String {
        let use_fallback = fallback_override.resolve(self.options.enable_fallback);
        info!(
            "Fallback for {}: {}",
            source,
            if use_fallback { "ENABLED" } else { "DISABLED" }
        );

        let (document, fields) = match filter_document(xml, allow_list, source, window) {
            Ok(filtered) => filtered,
            Err(e) => {
                error!("Failed to process XML from {}: {}", source, e);
                return xml.to_string();
            }
        };

        info!("Translating {} whitelisted fields with {} workers...", fields.len(), self.options.workers);
        let outcomes = self
            .batch_translator()
            .translate_fields_with_progress(&fields, use_fallback, progress_callback)
            .await;

        let merged = merge_outcomes(&document, &fields, &outcomes);
        info!("Rewrote {} of {} fields in {}", merged.rewritten, fields.len(), source);
        merged.xml
    }

    /// Translate a single text, skipping languages that need no translation
    pub async fn translate_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        if let Some(detector) = &self.detector {
            match detector.detect(text).await {
                Ok(language) if language_utils::is_skipped_language(&language, &self.options.skip_languages) => {
                    debug!("Skipping \"{}\": detected language {} needs no translation", text, language);
                    return text.to_string();
                }
                Ok(language) => debug!("Detected {} for \"{}\"", language, text),
                Err(e) => warn!("Language detection failed for \"{}\": {}; translating anyway", text, e),
            }
        }

        match self.primary.translate(text).await {
            Ok(translated) if !translated.trim().is_empty() && translated != text => return translated,
            Ok(_) => debug!("{} translation unchanged: \"{}\"", self.primary.name(), text),
            Err(e) => error!("{} translation error: \"{}\": {}", self.primary.name(), text, e),
        }

        if self.options.enable_fallback {
            if let Some(fallback) = &self.fallback {
                match fallback.translate(text).await {
                    Ok(translated) => {
                        if translated == text {
                            warn!("{} translation unchanged: \"{}\"", fallback.name(), text);
                        }
                        if !translated.trim().is_empty() {
                            return translated;
                        }
                    }
                    Err(e) => error!("{} translation error: \"{}\": {}", fallback.name(), text, e),
                }
            }
        }

        text.to_string()
    }
}
