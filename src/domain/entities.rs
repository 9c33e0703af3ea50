//! Domain entities. Pure data structures for the forwarding pipeline.
//!
//! No HTTP/storage types here; adapters map to and from these.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp format used by the capture layer for `received_at`.
pub const RECEIVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A captured text message. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub content: String,
    /// Capture time as the device formatted it (e.g. `2024-01-02 10:20:30.123`).
    pub received_at: String,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        content: impl Into<String>,
        received_at: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            received_at: received_at.into(),
        }
    }

    /// Build a message stamped with the current local time in [`RECEIVED_AT_FORMAT`].
    pub fn captured_now(sender: impl Into<String>, content: impl Into<String>) -> Self {
        let received_at = Local::now().format(RECEIVED_AT_FORMAT).to_string();
        Self::new(sender, content, received_at)
    }
}

/// OAuth session: access token plus the instance base URL for REST calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub instance_url: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, instance_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            instance_url: instance_url.into(),
        }
    }

    /// A credential without an access token is never used for forwarding.
    pub fn is_usable(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

// Keep the token out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// Result of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    NotTransactional,
    Transactional {
        /// Content with line breaks collapsed to spaces.
        content: String,
        /// CRM-side dedup key derived from `received_at`.
        external_id: String,
    },
}

impl Classification {
    pub fn is_transactional(&self) -> bool {
        matches!(self, Self::Transactional { .. })
    }
}

/// Why a single message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// CRM answered with something other than 201 Created.
    HttpStatus(u16),
    /// Request never produced a response (connect, TLS, body read...).
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Transport(e) => write!(f, "transport: {}", e),
        }
    }
}

/// Per-message forwarding result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardingOutcome {
    Sent,
    DroppedNotTransactional,
    Failed(FailureReason),
}

/// Monotonic id assigned by the dispatcher to each submitted batch.
pub type BatchId = u64;

/// What happened to a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// No usable credential could be obtained; nothing was sent.
    AuthenticationFailed(String),
    /// Outcomes in input order, one per message.
    Completed(Vec<ForwardingOutcome>),
}

/// Report emitted once a batch reaches `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    /// Counts of (sent, dropped, failed). All zero when authentication failed.
    pub fn tally(&self) -> BatchTally {
        let mut tally = BatchTally::default();
        if let BatchOutcome::Completed(outcomes) = &self.outcome {
            for o in outcomes {
                match o {
                    ForwardingOutcome::Sent => tally.sent += 1,
                    ForwardingOutcome::DroppedNotTransactional => tally.dropped += 1,
                    ForwardingOutcome::Failed(_) => tally.failed += 1,
                }
            }
        }
        tally
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub sent: usize,
    pub dropped: usize,
    pub failed: usize,
}

/// Worker lifecycle for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchState {
    #[default]
    Idle,
    AcquiringCredential,
    Sending,
    Done,
}

/// User-facing events. The presentation layer subscribes and renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    AuthenticationFailed { batch_id: Option<BatchId>, error: String },
    BatchForwarded { batch_id: BatchId, tally: BatchTally },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_usable() {
        assert!(Credential::new("tok", "https://x.my.salesforce.com").is_usable());
        assert!(!Credential::new("", "https://x.my.salesforce.com").is_usable());
        assert!(!Credential::new("   ", "https://x.my.salesforce.com").is_usable());
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let c = Credential::new("secret-token", "https://x.my.salesforce.com");
        let dbg = format!("{:?}", c);
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("x.my.salesforce.com"));
    }

    #[test]
    fn test_captured_now_format() {
        let m = Message::captured_now("VM-HDFCBK", "Rs 10 debited");
        assert!(chrono::NaiveDateTime::parse_from_str(&m.received_at, RECEIVED_AT_FORMAT).is_ok());
    }

    #[test]
    fn test_tally() {
        let report = BatchReport {
            batch_id: 1,
            outcome: BatchOutcome::Completed(vec![
                ForwardingOutcome::Sent,
                ForwardingOutcome::DroppedNotTransactional,
                ForwardingOutcome::Failed(FailureReason::HttpStatus(400)),
                ForwardingOutcome::Sent,
            ]),
        };
        assert_eq!(
            report.tally(),
            BatchTally {
                sent: 2,
                dropped: 1,
                failed: 1
            }
        );
    }
}
