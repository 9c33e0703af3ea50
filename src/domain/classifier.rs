//! Decides whether a message is a financial transaction worth forwarding.
//!
//! Pure and case-insensitive: any single marker hit classifies as transactional.

use super::entities::{Classification, Message};
use super::external_id::ExternalIdMode;
use std::borrow::Cow;

/// Lowercase substrings that mark a message as transactional.
pub const TRANSACTION_MARKERS: &[&str] = &[
    "rs ",
    "sent rs.",
    "amount",
    "amt",
    "credited",
    "debited",
    "bank account",
    "a/c *9560",
    "bank card",
    "balance",
    "available bal",
    "money received",
    "money sent",
    "a/c xx9560",
];

/// Returns true if `content` contains any of [`TRANSACTION_MARKERS`] (case-insensitive).
pub fn is_transactional(content: &str) -> bool {
    Classifier::default().classify(content)
}

/// Collapse `\r\n` / `\n` line breaks to a single space. A lone `\r` is kept.
pub fn normalize_content(content: &str) -> Cow<'_, str> {
    if !content.contains('\n') {
        return Cow::Borrowed(content);
    }
    Cow::Owned(content.replace("\r\n", " ").replace('\n', " "))
}

/// Marker-based classifier. `Default` uses [`TRANSACTION_MARKERS`].
#[derive(Debug, Clone)]
pub struct Classifier {
    markers: Vec<String>,
    id_mode: ExternalIdMode,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            markers: TRANSACTION_MARKERS.iter().map(|m| m.to_string()).collect(),
            id_mode: ExternalIdMode::default(),
        }
    }
}

impl Classifier {
    pub fn new(id_mode: ExternalIdMode) -> Self {
        Self {
            id_mode,
            ..Self::default()
        }
    }

    /// Add extra markers (e.g. other masked account numbers). Stored lowercase.
    pub fn with_extra_markers<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.markers.extend(
            extra
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty()),
        );
        self
    }

    pub fn id_mode(&self) -> ExternalIdMode {
        self.id_mode
    }

    /// Empty content is never transactional.
    pub fn classify(&self, content: &str) -> bool {
        if content.is_empty() {
            return false;
        }
        let lower = content.to_lowercase();
        self.markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// Classify a captured message. Markers are matched against the normalized content.
    pub fn evaluate(&self, message: &Message) -> Classification {
        let content = normalize_content(&message.content);
        if !self.classify(&content) {
            return Classification::NotTransactional;
        }
        Classification::Transactional {
            content: content.into_owned(),
            external_id: self.id_mode.derive(&message.received_at),
        }
    }
}
