use anyhow::{Result, Context};
use log::{error, warn, info};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::epg::{ChannelFilters, FallbackOverride, TimeWindow};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::translation::TranslationService;

// @module: Application controller for EPG sources

/// Filter file header for downloaded guides
pub const URL_HEADER: &str = "URL";

/// Filter file header for local guides
pub const PATH_HEADER: &str = "PATH";

/// Where a guide comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Url,
    Path,
}

/// One guide to retrieve, translate and write out
#[derive(Debug, Clone, PartialEq)]
pub struct SourceJob {
    pub source: String,
    pub kind: SourceKind,
    /// Channels to keep; `None` keeps every channel
    pub allow_list: Option<BTreeSet<String>>,
    pub fallback: FallbackOverride,
}

impl SourceJob {
    // @returns: File name of the translated guide
    pub fn output_name(&self) -> String {
        match self.kind {
            SourceKind::Url => FileManager::output_name_for_url(&self.source),
            SourceKind::Path => FileManager::output_name_for_path(&self.source),
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<String>,
}

/// Main application controller for EPG translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Translation service built from the configuration
    service: TranslationService,
    // @field: HTTP client for guide downloads
    client: reqwest::Client,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::from_config(&config)
            .context("Failed to create translation service")?;
        Ok(Self::with_service(config, service))
    }

    /// Create a controller around an existing translation service
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.sources.download_timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, service, client }
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Build the ordered list of guides to process.
    ///
    /// Filtered URLs come first, then unfiltered URLs, then filtered and
    /// unfiltered local paths. A source that is both listed and filtered is
    /// processed once, with its filter.
    pub fn plan_jobs(&self) -> Result<Vec<SourceJob>> {
        let sources = &self.config.sources;
        let mut jobs = Vec::new();

        for (kind, list_file, filter_file, header) in [
            (SourceKind::Url, &sources.url_list_file, &sources.url_filter_file, URL_HEADER),
            (SourceKind::Path, &sources.local_paths_file, &sources.local_filter_file, PATH_HEADER),
        ] {
            let filters = ChannelFilters::load(filter_file, header)?;
            let listed = FileManager::read_source_list(list_file)?;

            for (source, channels) in filters.sources() {
                jobs.push(SourceJob {
                    source: source.to_string(),
                    kind,
                    allow_list: Some(channels.clone()),
                    fallback: filters.fallback_override(source),
                });
            }

            for source in listed {
                if filters.contains(&source) {
                    warn!(
                        "{} is listed in both {} and {}; only the filtered version will be processed",
                        source, list_file, filter_file
                    );
                    continue;
                }
                jobs.push(SourceJob {
                    fallback: filters.fallback_override(&source),
                    source,
                    kind,
                    allow_list: None,
                });
            }
        }

        Ok(jobs)
    }

    /// Run the whole workflow at the current time
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(&TimeWindow::from_now()).await
    }

    /// Run the whole workflow within a fixed time window
    pub async fn run_at(&self, window: &TimeWindow) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();
        let jobs = self.plan_jobs()?;
        if jobs.is_empty() {
            warn!("No EPG sources configured");
            return Ok(RunSummary::default());
        }

        match language_utils::get_language_name(&self.config.target_language) {
            Ok(name) => info!("Translating {} sources into {} ({})", jobs.len(), name, self.config.target_language),
            Err(e) => warn!("Unrecognised target language '{}': {}", self.config.target_language, e),
        }

        let output_dir = PathBuf::from(&self.config.sources.output_folder);
        if !FileManager::dir_exists(&output_dir) {
            info!("Creating output folder {:?}", output_dir);
            FileManager::ensure_dir(&output_dir)?;
        }

        let mut summary = RunSummary::default();
        for job in &jobs {
            match self.process_job(job, &output_dir, window).await {
                Ok(path) => summary.written.push(path),
                Err(e) => {
                    error!("Skipping {}: {:#}", job.source, e);
                    summary.failed.push(job.source.clone());
                }
            }
        }

        info!(
            "Processed {} sources ({} failed) in {:.1}s",
            jobs.len(),
            summary.failed.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(summary)
    }

    async fn process_job(&self, job: &SourceJob, output_dir: &std::path::Path, window: &TimeWindow) -> Result<PathBuf> {
        let label = if job.allow_list.is_some() { "filtered" } else { "full" };
        info!("Processing {} guide: {}", label, job.source);

        let xml = self.fetch(job).await?;

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(job.output_name());

        let translated = self
            .service
            .translate_document_at(
                &xml,
                job.allow_list.as_ref(),
                &job.source,
                job.fallback,
                window,
                |completed, total| {
                    progress_bar.set_length(total as u64);
                    progress_bar.set_position(completed as u64);
                },
            )
            .await;
        progress_bar.finish_and_clear();

        let output_path = FileManager::generate_output_path(output_dir, &job.output_name());
        FileManager::write_to_file(&output_path, &translated)?;
        info!("Saved translated EPG to {:?}", output_path);
        Ok(output_path)
    }

    /// Retrieve the raw guide text
    async fn fetch(&self, job: &SourceJob) -> Result<String> {
        match job.kind {
            SourceKind::Path => FileManager::read_to_string(&job.source),
            SourceKind::Url => {
                info!("Downloading {}", job.source);
                let response = self
                    .client
                    .get(&job.source)
                    .send()
                    .await
                    .with_context(|| format!("Failed to download {}", job.source))?
                    .error_for_status()
                    .with_context(|| format!("Failed to download {}", job.source))?;
                response
                    .text()
                    .await
                    .with_context(|| format!("Failed to read response body from {}", job.source))
            }
        }
    }

    /// Translate a single text through the configured providers
    pub async fn translate_text(&self, text: &str) -> String {
        self.service.translate_text(text).await
    }
}
