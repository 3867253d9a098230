/*!
 * Merge translated text back into a guide and serialize it.
 */

use log::{debug, warn};
use std::borrow::Cow;
use std::ops::Range;

use super::document::{EpgDocument, TranslatableField};

/// Result of translating one field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TranslationOutcome {
    /// Keep the original text
    #[default]
    Unchanged,
    /// Replace the text with this value
    Rewritten(String),
}

impl TranslationOutcome {
    /// `"<translated> / <original>"`
    pub fn bilingual(translated: &str, original: &str) -> Self {
        Self::Rewritten(format!("{} / {}", translated, original))
    }

    /// The replacement text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Unchanged => None,
            Self::Rewritten(text) => Some(text),
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }
}

/// Serialized guide with merge statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub xml: String,
    /// Number of text nodes actually replaced
    pub rewritten: usize,
}

/// Escape text content the way XML serializers do
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Apply outcomes to their fields and serialize the pruned guide.
///
/// A field is only overwritten when the new value differs from the current
/// text after trimming both, so merging the same outcome twice is a no-op.
pub fn merge_outcomes(
    document: &EpgDocument<'_>,
    fields: &[TranslatableField],
    outcomes: &[TranslationOutcome],
) -> MergedDocument {
    if fields.len() != outcomes.len() {
        warn!(
            "Merging {} outcomes into {} fields; extra entries are ignored",
            outcomes.len(),
            fields.len()
        );
    }

    let mut edits: Vec<(Range<usize>, Cow<'_, str>)> = document
        .removed_spans()
        .into_iter()
        .map(|span| (span, Cow::Borrowed("")))
        .collect();

    let mut rewritten = 0;
    for (field, outcome) in fields.iter().zip(outcomes) {
        let Some(new_text) = outcome.text() else {
            continue;
        };
        if new_text.trim() == field.text.trim() {
            continue;
        }
        match &field.text_span {
            Some(span) => {
                edits.push((span.clone(), escape_text(new_text)));
                rewritten += 1;
            }
            None => debug!("No text node to rewrite for <{}> under <{}>", field.tag, field.parent.as_str()),
        }
    }

    edits.sort_by_key(|(span, _)| span.start);

    let source = document.source_text();
    let mut xml = String::with_capacity(source.len() + source.len() / 4);
    let mut cursor = 0;
    for (span, replacement) in edits {
        if span.start < cursor {
            // Nested in an earlier edit
            continue;
        }
        xml.push_str(&source[cursor..span.start]);
        xml.push_str(&replacement);
        cursor = span.end;
    }
    xml.push_str(&source[cursor..]);

    MergedDocument { xml, rewritten }
}
