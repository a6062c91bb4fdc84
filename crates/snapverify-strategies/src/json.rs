//! JSON snapshots with structural comparison.

use crate::text::render_line_diff;
use async_trait::async_trait;
use snapverify::{Attachment, DiffReport, Strategy, StrategyError};

/// Snapshots `serde_json::Value`s and compares them structurally.
///
/// References are stored pretty-printed, but comparison happens on the
/// decoded values, so reformatting a reference file never breaks a test.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStrategy;

impl JsonStrategy {
    /// Create a JSON strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for JsonStrategy {
    type Value = serde_json::Value;
    type Format = serde_json::Value;

    async fn snapshot(&self, value: serde_json::Value) -> Result<serde_json::Value, StrategyError> {
        Ok(value)
    }

    fn to_bytes(&self, format: &serde_json::Value) -> Result<Vec<u8>, StrategyError> {
        let mut bytes = serde_json::to_vec_pretty(format)
            .map_err(|e| StrategyError::with_source("failed to encode json snapshot", e))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<serde_json::Value, StrategyError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StrategyError::with_source("reference is not valid json", e))
    }

    fn diff(
        &self,
        reference: &serde_json::Value,
        candidate: &serde_json::Value,
    ) -> Option<DiffReport> {
        if reference == candidate {
            return None;
        }

        let reference_pretty = serde_json::to_string_pretty(reference).unwrap_or_default();
        let candidate_pretty = serde_json::to_string_pretty(candidate).unwrap_or_default();
        let rendered = render_line_diff(&reference_pretty, &candidate_pretty);
        let report = DiffReport::new(format!(
            "json snapshot does not match the reference:\n{rendered}"
        ))
        .with_attachment(Attachment::new("diff", rendered.into_bytes()));
        Some(report)
    }

    fn file_extension(&self) -> Option<&str> {
        Some("json")
    }
}
