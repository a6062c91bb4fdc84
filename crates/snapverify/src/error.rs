//! Error types for snapshot verification.

use std::time::Duration;
use thiserror::Error;

/// Result type for verification operations.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors that can occur while producing or persisting a snapshot.
///
/// Everything here is converted into a textual [`Outcome::Error`] at the
/// verification boundary; callers of the engine never see these directly
/// unless they drive the lower-level components themselves.
///
/// [`Outcome::Error`]: crate::Outcome::Error
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Snapshot generation exceeded the allotted time.
    #[error(
        "snapshot generation timed out after {timeout:?} - a strategy that \
         renders asynchronously may need a longer timeout"
    )]
    Timeout { timeout: Duration },

    /// The strategy's producer failed or completed abnormally.
    #[error("snapshot generation failed: {0}")]
    Generation(String),

    /// Evaluating the caller-supplied value producer failed.
    #[error("failed to evaluate the snapshot value: {0}")]
    Value(String),

    /// Directory creation or file read/write failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Strategy encode/decode failed.
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Error raised by a strategy's producer or codec.
///
/// Strategies are caller-supplied, so this is deliberately unstructured: a
/// display message plus an optional source error.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StrategyError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StrategyError {
    /// Create an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping a source error.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<anyhow::Error> for StrategyError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}
