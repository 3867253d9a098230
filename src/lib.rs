/*!
 * # EPG Translator
 *
 * A Rust library that filters XMLTV electronic programme guides and
 * translates their titles and descriptions into a bilingual form.
 *
 * ## Features
 *
 * - Per-source channel allow-lists read from plain-text filter files
 * - Pruning of programmes that ended or start beyond a two-day horizon
 * - Concurrent batch translation with a retried fallback provider:
 *   - Google Translate (public endpoint)
 *   - OpenAI API
 * - Byte-preserving rewrite of the guide: only pruned elements and
 *   translated text nodes change
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `epg`: Guide handling:
 *   - `epg::filter_config`: Channel filter file parser
 *   - `epg::document`: Parsing, pruning and field enumeration
 *   - `epg::merge`: Merging translations back into the guide
 * - `translation`: Translation services:
 *   - `translation::core`: Document and single-text entry points
 *   - `translation::batch`: Concurrent batch processing
 *   - `translation::fallback`: Fallback provider with retry
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for translation providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod epg;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use epg::{ChannelFilters, FallbackOverride, TimeWindow, TranslatableField, TranslationOutcome};
pub use translation::TranslationService;
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, EpgError, ProviderError};
