// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use epg_translator::app_config::{self, Config};
use epg_translator::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter and translate every configured guide (default command)
    Run,

    /// Translate a single text with the configured providers
    Text {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Generate shell completions for epg-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command
#[derive(Args, Debug)]
struct GlobalOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Number of translation batches in flight
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Directory receiving translated guides
    #[arg(short, long, global = true)]
    output_folder: Option<String>,

    /// Target language code (e.g., 'en', 'de', 'fr')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Enable the fallback provider for sources without an override
    #[arg(long, global = true, conflicts_with = "disable_fallback")]
    enable_fallback: bool,

    /// Disable the fallback provider for sources without an override
    #[arg(long, global = true)]
    disable_fallback: bool,
}

/// EPG Translator - bilingual electronic programme guides
///
/// Filters XMLTV guides down to the channels you care about and the next two
/// days, then translates programme titles and descriptions.
#[derive(Parser, Debug)]
#[command(name = "epg-translator")]
#[command(version)]
#[command(about = "Filter and translate XMLTV programme guides")]
#[command(long_about = "epg-translator downloads or reads XMLTV guides, keeps the allowed channels and the
programmes of the next two days, and rewrites titles and descriptions as
\"<translation> / <original>\".

EXAMPLES:
    epg-translator                              # Process every configured source
    epg-translator -w 4 --enable-fallback       # Four workers, fallback provider on
    epg-translator -t de -o out/                # Translate into German, write to out/
    epg-translator text \"Nachrichten am Abend\"  # Translate a single text
    epg-translator completions bash > epg.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SOURCES:
    epg_urls.txt / local_epg_paths.txt            one guide per line
    url_channel_filters.txt (header URL)          channel allow-lists per URL
    local_channel_filters.txt (header PATH)       channel allow-lists per path
    A header suffixed with F forces the fallback provider on, NF forces it off.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; log::set_max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("📺", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &GlobalOptions) {
    if let Some(workers) = options.workers {
        config.translation.workers = workers;
    }

    if let Some(output_folder) = &options.output_folder {
        config.sources.output_folder = output_folder.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if options.enable_fallback {
        config.translation.enable_fallback = true;
    } else if options.disable_fallback {
        config.translation.enable_fallback = false;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "epg-translator", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.global.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    // Load or create configuration
    let (mut config, created) = Config::load_or_create(&cli.global.config_path)
        .context("Failed to load configuration")?;
    if created {
        warn!("Config file not found at '{}', created default config.", cli.global.config_path);
    }

    apply_overrides(&mut config, &cli.global);

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match cli.command {
        Some(Commands::Text { text }) => {
            let translated = controller.translate_text(&text).await;
            println!("{}", translated);
        }
        Some(Commands::Run) | None => {
            let summary = controller.run().await?;
            info!("Wrote {} translated guides", summary.written.len());
            if !summary.failed.is_empty() {
                error!("Failed sources: {}", summary.failed.join(", "));
            }
        }
        Some(Commands::Completions { .. }) => {}
    }

    Ok(())
}
