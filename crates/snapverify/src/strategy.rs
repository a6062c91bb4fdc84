//! The pluggable strategy protocol.
//!
//! A [`Strategy`] tells the engine how to turn a value into comparable
//! bytes and how to diff two serialized instances. The engine supplies
//! everything else: identity, timeouts, persistence, and the
//! record/compare decision.

use crate::error::StrategyError;
use async_trait::async_trait;

/// A named binary blob emitted alongside a mismatch summary.
///
/// Attachments are handed back to the caller for the host framework's
/// failure report; the engine itself only persists the candidate and the
/// optional difference artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name (e.g. `"diff"`, `"reference.png"`).
    pub name: String,
    /// Raw attachment content.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create a new attachment.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A strategy's verdict on two formats that differ.
#[derive(Debug, Clone)]
pub struct DiffReport {
    /// Human-readable mismatch summary, suitable for direct display.
    pub summary: String,
    /// Zero or more binary/visual attachments for the failure report.
    pub attachments: Vec<Attachment>,
}

impl DiffReport {
    /// Create a report with the given summary and no attachments.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            attachments: Vec::new(),
        }
    }

    /// Add an attachment to the report.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// The contract a snapshot strategy implements.
///
/// `Value` is whatever the test hands in; `Format` is the comparable,
/// serializable form the strategy produces from it. Implementations must
/// uphold the round-trip law: `from_bytes(to_bytes(f))` is diff-equivalent
/// to `f`, i.e. `diff(f, round_tripped)` returns `None`.
#[async_trait]
pub trait Strategy: Send + Sync + 'static {
    /// The type of value the test produces.
    type Value: Send + 'static;
    /// The serialized, comparable form of a value.
    type Format: Send + 'static;

    /// Produce the serialized format for a value.
    ///
    /// May complete immediately or after a delay (e.g. awaiting a
    /// rendering pipeline); the engine bounds the wait with a timeout. On
    /// timeout the wait ends but this future's task keeps running
    /// detached - no cancellation is propagated, and cleanup of abandoned
    /// work is the strategy's own responsibility.
    async fn snapshot(&self, value: Self::Value) -> Result<Self::Format, StrategyError>;

    /// Encode a format into the bytes persisted on disk.
    fn to_bytes(&self, format: &Self::Format) -> Result<Vec<u8>, StrategyError>;

    /// Decode a format from persisted bytes.
    fn from_bytes(&self, bytes: &[u8]) -> Result<Self::Format, StrategyError>;

    /// Compare a reference against a candidate.
    ///
    /// Returns `None` when the two are considered equal; otherwise a
    /// human-readable summary plus attachments for the failure report.
    fn diff(&self, reference: &Self::Format, candidate: &Self::Format) -> Option<DiffReport>;

    /// Optional secondary artifact describing the mismatch (e.g. a visual
    /// diff image), persisted separately from the raw candidate.
    fn difference(
        &self,
        _reference: &Self::Format,
        _candidate: &Self::Format,
    ) -> Option<Self::Format> {
        None
    }

    /// File extension for persisted artifacts, without the leading dot.
    /// `None` writes bare files.
    fn file_extension(&self) -> Option<&str> {
        None
    }

    /// Whether a format is a degenerate (empty/zero-sized) rendering.
    ///
    /// When both the reference and the candidate are degenerate they are
    /// treated as equal without consulting [`diff`](Strategy::diff). This
    /// is a compatibility shim for renderers whose valid empty output is
    /// not stably regenerable; leave the default unless a format needs it.
    fn is_degenerate(&self, _format: &Self::Format) -> bool {
        false
    }
}
