/*!
 * Translation of EPG text fields.
 *
 * - `core`: the translation service and its document / single-text entry points
 * - `batch`: concurrent batch translation against the primary provider
 * - `fallback`: retried fallback translation of what the primary provider left
 */

// Re-export main types for easier usage
pub use self::batch::BatchTranslator;
pub use self::core::{TranslationOptions, TranslationService};
pub use self::fallback::{FallbackTranslator, RetryPolicy};

// Submodules
pub mod batch;
pub mod core;
pub mod fallback;
