/*!
 * EPG document filtering.
 *
 * Parses an XMLTV guide, drops programmes outside the translation window and
 * channels outside the allow-list, and enumerates the text fields that are
 * eligible for translation in document order.
 *
 * The parsed tree is never rewritten. Pruning records which children of the
 * root are kept; serialization later splices the original text around the
 * removed nodes so everything else is emitted byte for byte.
 */

use chrono::{Duration, NaiveDateTime, Utc};
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::ops::Range;

use crate::errors::EpgError;

/// Layout of the significant part of `start` / `stop` attributes
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Programmes ending later than this many days from now are dropped
pub const HORIZON_DAYS: i64 = 2;

/// Parse the first 14 characters of an XMLTV timestamp (`20240101120000 +0100`).
/// The timezone suffix is ignored.
pub fn parse_epg_timestamp(value: &str) -> Option<NaiveDateTime> {
    let digits = value.as_bytes().get(..14)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    NaiveDateTime::parse_from_str(&value[..14], TIMESTAMP_FORMAT).ok()
}

/// The `[now, now + 2 days]` window programmes must fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    now: NaiveDateTime,
    horizon: NaiveDateTime,
}

impl TimeWindow {
    /// Window starting at a fixed instant (naive UTC)
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now,
            horizon: now + Duration::days(HORIZON_DAYS),
        }
    }

    /// Window starting at the current wall-clock time
    pub fn from_now() -> Self {
        Self::starting_at(Utc::now().naive_utc())
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn horizon(&self) -> NaiveDateTime {
        self.horizon
    }

    /// A programme is kept when its stop time parses and lies in `(now, horizon]`
    pub fn keeps_stop(&self, stop: Option<&str>) -> bool {
        match stop.and_then(parse_epg_timestamp) {
            Some(stop) => stop > self.now && stop <= self.horizon,
            None => false,
        }
    }

    /// A programme's fields are translated when its start parses and is not past the horizon
    pub fn translates_start(&self, start: Option<&str>) -> bool {
        match start.and_then(parse_epg_timestamp) {
            Some(start) => start <= self.horizon,
            None => false,
        }
    }
}

/// Element kinds whose children can be translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKind {
    Channel,
    Programme,
}

impl ParentKind {
    /// Map an element name to a parent kind
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "channel" => Some(Self::Channel),
            "programme" => Some(Self::Programme),
            _ => None,
        }
    }

    /// Child element names eligible for translation under this parent
    pub fn translatable_tags(&self) -> &'static [&'static str] {
        match self {
            Self::Channel => &["display-name"],
            Self::Programme => &["title", "desc", "category", "country"],
        }
    }

    pub fn allows(&self, tag: &str) -> bool {
        self.translatable_tags().contains(&tag)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Programme => "programme",
        }
    }
}

/// A text-bearing element selected for translation.
/// Fields are identified by their position in the enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableField {
    /// Kind of the parent element
    pub parent: ParentKind,
    /// Element name (`title`, `display-name`, ...)
    pub tag: String,
    /// Unescaped text before the first child element; empty when absent
    pub text: String,
    /// Byte range of the text node in the source document
    pub(crate) text_span: Option<Range<usize>>,
}

impl TranslatableField {
    /// Field with no source position, for feeding the orchestrator directly
    pub fn detached(parent: ParentKind, tag: &str, text: &str) -> Self {
        Self {
            parent,
            tag: tag.to_string(),
            text: text.to_string(),
            text_span: None,
        }
    }
}

/// Counts of what pruning removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub programmes_kept: usize,
    pub programmes_removed: usize,
    pub channels_kept: usize,
    pub channels_removed: usize,
}

/// Allow-list entries that were / were not found in a guide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelCoverage {
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

/// A parsed EPG guide together with its pruning decisions
#[derive(Debug)]
pub struct EpgDocument<'input> {
    source: &'input str,
    tree: roxmltree::Document<'input>,
    // Keep flags for the root's children, in document order
    retained: Vec<bool>,
}

impl<'input> EpgDocument<'input> {
    /// Parse a guide. A DOCTYPE is accepted since XMLTV files usually carry one.
    pub fn parse(xml: &'input str) -> Result<Self, EpgError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let tree = roxmltree::Document::parse_with_options(xml, options)?;
        let retained = vec![true; tree.root_element().children().count()];
        Ok(Self {
            source: xml,
            tree,
            retained,
        })
    }

    /// The text the document was parsed from
    pub fn source_text(&self) -> &'input str {
        self.source
    }

    fn top_level(&self, tag: &'static str) -> impl Iterator<Item = roxmltree::Node<'_, 'input>> + '_ {
        self.tree
            .root_element()
            .children()
            .zip(self.retained.iter())
            .filter(move |(node, keep)| **keep && node.has_tag_name(tag))
            .map(|(node, _)| node)
    }

    /// Ids of retained `channel` elements, in document order
    pub fn channel_ids(&self) -> Vec<String> {
        self.top_level("channel")
            .filter_map(|node| node.attribute("id"))
            .map(str::to_string)
            .collect()
    }

    /// Number of retained `programme` elements
    pub fn programme_count(&self) -> usize {
        self.top_level("programme").count()
    }

    /// Compare an allow-list with every channel id referenced by the guide
    pub fn channel_coverage(&self, allow_list: &BTreeSet<String>) -> ChannelCoverage {
        let present: BTreeSet<&str> = self
            .top_level("channel")
            .filter_map(|node| node.attribute("id"))
            .chain(self.top_level("programme").filter_map(|node| node.attribute("channel")))
            .collect();

        let (matched, missing) = allow_list
            .iter()
            .cloned()
            .partition(|id| present.contains(id.as_str()));
        ChannelCoverage { matched, missing }
    }

    /// Drop out-of-window programmes and, when an allow-list is given, foreign channels
    pub fn prune(&mut self, allow_list: Option<&BTreeSet<String>>, window: &TimeWindow) -> PruneStats {
        let allowed = |id: Option<&str>| match allow_list {
            Some(list) => id.is_some_and(|id| list.contains(id)),
            None => true,
        };

        // Decide on a snapshot of the children, then install the new keep flags
        let children: Vec<roxmltree::Node<'_, 'input>> = self.tree.root_element().children().collect();
        let mut stats = PruneStats::default();
        let mut retained = Vec::with_capacity(children.len());

        for (node, was_kept) in children.iter().zip(self.retained.iter()) {
            let keep = *was_kept
                && match node.tag_name().name() {
                    _ if !node.is_element() => true,
                    "programme" => {
                        let keep = allowed(node.attribute("channel"))
                            && window.keeps_stop(node.attribute("stop"));
                        if keep {
                            stats.programmes_kept += 1;
                        } else {
                            stats.programmes_removed += 1;
                        }
                        keep
                    }
                    "channel" => {
                        let keep = allowed(node.attribute("id"));
                        if keep {
                            stats.channels_kept += 1;
                        } else {
                            stats.channels_removed += 1;
                        }
                        keep
                    }
                    _ => true,
                };
            retained.push(keep);
        }

        self.retained = retained;
        stats
    }

    /// Enumerate translatable fields of the retained tree in document order
    pub fn translatable_fields(&self, window: &TimeWindow) -> Vec<TranslatableField> {
        let root = self.tree.root_element();
        let parents = std::iter::once(root).chain(
            root.children()
                .zip(self.retained.iter())
                .filter(|(_, keep)| **keep)
                .flat_map(|(node, _)| node.descendants()),
        );

        let mut fields = Vec::new();
        for parent in parents.filter(|node| node.is_element()) {
            let Some(kind) = ParentKind::from_tag(parent.tag_name().name()) else {
                continue;
            };
            // Programmes starting past the horizon (or without a usable start) stay as they are
            if kind == ParentKind::Programme && !window.translates_start(parent.attribute("start")) {
                continue;
            }

            for child in parent.children().filter(|node| node.is_element()) {
                let tag = child.tag_name().name();
                if !kind.allows(tag) {
                    continue;
                }
                let (text, text_span) = self.leading_text(child);
                fields.push(TranslatableField {
                    parent: kind,
                    tag: tag.to_string(),
                    text,
                    text_span,
                });
            }
        }
        fields
    }

    /// Text of an element up to its first child element, comments skipped.
    ///
    /// The span runs from the first content node to the first child element or
    /// the closing tag, so CDATA sections and comments mixed into the text are
    /// covered as a whole. `None` when there is no text at all.
    fn leading_text(&self, element: roxmltree::Node<'_, 'input>) -> (String, Option<Range<usize>>) {
        let mut text = String::new();
        let mut has_text = false;
        let mut start = None;
        let mut end = None;

        for node in element.children() {
            if node.is_element() {
                end = Some(node.range().start);
                break;
            }
            start.get_or_insert(node.range().start);
            if node.is_text() {
                text.push_str(node.text().unwrap_or_default());
                has_text = true;
            }
        }

        let (Some(start), true) = (start, has_text) else {
            return (text, None);
        };
        let end = end.or_else(|| {
            let range = element.range();
            self.source[range.clone()].rfind("</").map(|offset| range.start + offset)
        });
        (text, end.map(|end| start..end))
    }

    /// Byte ranges of removed elements, each extended over its trailing text
    pub(crate) fn removed_spans(&self) -> Vec<Range<usize>> {
        self.tree
            .root_element()
            .children()
            .zip(self.retained.iter())
            .filter(|(node, keep)| !**keep && node.is_element())
            .map(|(node, _)| {
                let range = node.range();
                match node.next_sibling().filter(|next| next.is_text()) {
                    Some(tail) => range.start..tail.range().end,
                    None => range,
                }
            })
            .collect()
    }
}

/// Log which allow-listed channels a guide actually contains
fn report_channel_coverage(coverage: &ChannelCoverage, source: &str) {
    if coverage.matched.is_empty() {
        warn!("None of the specified channels were found in: {}", source);
    } else {
        info!(
            "Found channels to translate in {}: {:?}",
            source,
            coverage.matched.iter().collect::<Vec<_>>()
        );
    }

    if !coverage.missing.is_empty() {
        error!(
            "Channels not found in {}: {:?}",
            source,
            coverage.missing.iter().collect::<Vec<_>>()
        );
    }
}

/// Parse, prune and enumerate a guide in one step
pub fn filter_document<'input>(
    xml: &'input str,
    allow_list: Option<&BTreeSet<String>>,
    source: &str,
    window: &TimeWindow,
) -> Result<(EpgDocument<'input>, Vec<TranslatableField>), EpgError> {
    let mut document = EpgDocument::parse(xml)?;

    if let Some(list) = allow_list {
        report_channel_coverage(&document.channel_coverage(list), source);
    }

    let stats = document.prune(allow_list, window);
    info!(
        "{}: kept {} programmes ({} removed), {} channels ({} removed)",
        source, stats.programmes_kept, stats.programmes_removed, stats.channels_kept, stats.channels_removed
    );

    let fields = document.translatable_fields(window);
    Ok((document, fields))
}
