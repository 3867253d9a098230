/*!
 * Channel filter files.
 *
 * A filter file lists EPG sources, each followed by the channel ids to keep:
 *
 * ```text
 * URLF http://example.com/guide.xml
 * Channel1
 * Channel2
 * #URL http://example.com/disabled.xml
 * Channel3
 * ```
 *
 * The header keyword is configurable (`URL` for remote guides, `PATH` for
 * local ones). `<header>NF` disables the fallback provider for that source,
 * `<header>F` forces it, a bare `<header>` leaves the process default. A
 * commented header (`#URL ...`) disables its whole block.
 */

use log::info;
use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;
use std::path::Path;

use crate::errors::EpgError;

/// Per-source decision about the fallback provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackOverride {
    /// Always use the fallback provider when needed (`<header>F`)
    Enabled,
    /// Never use the fallback provider (`<header>NF`)
    Disabled,
    /// Use the process-wide default (bare `<header>`)
    #[default]
    Unset,
}

impl FallbackOverride {
    /// Resolve against the process-wide default
    pub fn resolve(self, default_enabled: bool) -> bool {
        match self {
            Self::Enabled => true,
            Self::Disabled => false,
            Self::Unset => default_enabled,
        }
    }
}

/// One classified line of a filter file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `#<header> ...`: disables the block it opens
    CommentedHeader(&'a str),
    /// Any other `#` line
    Comment,
    /// `<header>[NF|F] <source>`
    Header {
        source: &'a str,
        fallback: FallbackOverride,
    },
    /// A channel id
    Channel(&'a str),
}

/// Classify a single line. Returns `None` for blank lines.
///
/// The `NF` suffix is tested before `F`, and `F` before the bare keyword, so
/// `URLF x` is never read as `URL` followed by `F x`.
pub fn classify_line<'a>(line: &'a str, header: &str) -> Option<Directive<'a>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('#') {
        if rest.starts_with(header) {
            return Some(Directive::CommentedHeader(line));
        }
        return Some(Directive::Comment);
    }

    if let Some(after) = line.strip_prefix(header) {
        let (rest, fallback) = if let Some(rest) = after.strip_prefix("NF") {
            (rest, FallbackOverride::Disabled)
        } else if let Some(rest) = after.strip_prefix('F') {
            (rest, FallbackOverride::Enabled)
        } else {
            (after, FallbackOverride::Unset)
        };
        return Some(Directive::Header {
            source: rest.trim(),
            fallback,
        });
    }

    Some(Directive::Channel(line))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    NoSource,
    Active(String),
    SkippedBlock,
}

/// Parsed filter file: channel allow-lists and fallback overrides per source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelFilters {
    // Insertion ordered: sources are processed in file order
    allow_lists: Vec<(String, BTreeSet<String>)>,
    fallback_overrides: HashMap<String, FallbackOverride>,
}

impl ChannelFilters {
    /// Parse filter directives from a string
    pub fn parse_str(content: &str, header: &str) -> Self {
        let mut parser = FilterParser::new(header);
        for line in content.lines() {
            parser.feed(line);
        }
        parser.finish()
    }

    /// Parse filter directives from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R, header: &str) -> std::io::Result<Self> {
        let mut parser = FilterParser::new(header);
        for line in reader.lines() {
            parser.feed(&line?);
        }
        Ok(parser.finish())
    }

    /// Load a filter file, or return empty filters when the file does not exist
    pub fn load<P: AsRef<Path>>(path: P, header: &str) -> Result<Self, EpgError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = std::fs::File::open(path).map_err(|e| EpgError::FilterFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_reader(std::io::BufReader::new(file), header).map_err(|e| EpgError::FilterFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Allow-list for a source, if the source has at least one channel line
    pub fn allow_list(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.allow_lists
            .iter()
            .find(|(key, _)| key == source)
            .map(|(_, channels)| channels)
    }

    /// Whether a source is filtered by channel
    pub fn contains(&self, source: &str) -> bool {
        self.allow_list(source).is_some()
    }

    /// Filtered sources with their allow-lists, in file order
    pub fn sources(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.allow_lists
            .iter()
            .map(|(source, channels)| (source.as_str(), channels))
    }

    /// Number of filtered sources
    pub fn len(&self) -> usize {
        self.allow_lists.len()
    }

    /// Whether no source is filtered
    pub fn is_empty(&self) -> bool {
        self.allow_lists.is_empty()
    }

    /// Fallback override for a source; exact match first, then case-insensitive
    pub fn fallback_override(&self, source: &str) -> FallbackOverride {
        if let Some(value) = self.fallback_overrides.get(source) {
            return *value;
        }
        let wanted = source.trim().to_lowercase();
        self.fallback_overrides
            .iter()
            .find(|(key, _)| key.trim().to_lowercase() == wanted)
            .map(|(_, value)| *value)
            .unwrap_or_default()
    }
}

/// Line-by-line filter file state machine
#[derive(Debug)]
pub struct FilterParser<'h> {
    header: &'h str,
    state: ParserState,
    filters: ChannelFilters,
}

impl<'h> FilterParser<'h> {
    /// Create a parser for the given header keyword
    pub fn new(header: &'h str) -> Self {
        Self {
            header,
            state: ParserState::NoSource,
            filters: ChannelFilters::default(),
        }
    }

    /// Feed one line
    pub fn feed(&mut self, line: &str) {
        let Some(directive) = classify_line(line, self.header) else {
            return;
        };

        match directive {
            Directive::CommentedHeader(text) => {
                info!("Skipped commented {}: {}", self.header.to_lowercase(), text);
                self.state = ParserState::SkippedBlock;
            }
            Directive::Comment => {}
            Directive::Header { source, fallback } => {
                self.filters
                    .fallback_overrides
                    .insert(source.to_string(), fallback);
                self.state = if source.is_empty() {
                    ParserState::NoSource
                } else {
                    ParserState::Active(source.to_string())
                };
            }
            Directive::Channel(channel) => {
                // Lines before any header or inside a skipped block are dropped
                if let ParserState::Active(source) = &self.state {
                    let source = source.clone();
                    self.add_channel(source, channel);
                }
            }
        }
    }

    fn add_channel(&mut self, source: String, channel: &str) {
        let lists = &mut self.filters.allow_lists;
        match lists.iter_mut().find(|(key, _)| *key == source) {
            Some((_, channels)) => {
                channels.insert(channel.to_string());
            }
            None => {
                let mut channels = BTreeSet::new();
                channels.insert(channel.to_string());
                lists.push((source, channels));
            }
        }
    }

    /// Whether a source block is currently open
    pub fn has_active_source(&self) -> bool {
        matches!(self.state, ParserState::Active(_))
    }

    /// Whether the parser is discarding lines after a commented header
    pub fn is_skipping(&self) -> bool {
        self.state == ParserState::SkippedBlock
    }

    /// Finish parsing and return the collected filters
    pub fn finish(self) -> ChannelFilters {
        self.filters
    }
}
