/*!
 * EPG document handling.
 *
 * - `filter_config`: channel filter files and per-source fallback overrides
 * - `document`: parsing, time/channel pruning and field enumeration
 * - `merge`: writing translations back and serializing the guide
 */

pub use self::document::{
    filter_document, parse_epg_timestamp, EpgDocument, ParentKind, PruneStats, TimeWindow,
    TranslatableField,
};
pub use self::filter_config::{ChannelFilters, FallbackOverride, FilterParser};
pub use self::merge::{merge_outcomes, MergedDocument, TranslationOutcome};

pub mod document;
pub mod filter_config;
pub mod merge;
