//! Raw byte snapshots.

use async_trait::async_trait;
use snapverify::{DiffReport, Strategy, StrategyError};

/// Snapshots raw byte buffers and compares them exactly.
///
/// Artifacts are written without a file extension. Empty buffers count as
/// degenerate, so an empty candidate matches an empty reference without a
/// byte comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesStrategy;

impl BytesStrategy {
    /// Create a byte strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for BytesStrategy {
    type Value = Vec<u8>;
    type Format = Vec<u8>;

    async fn snapshot(&self, value: Vec<u8>) -> Result<Vec<u8>, StrategyError> {
        Ok(value)
    }

    fn to_bytes(&self, format: &Vec<u8>) -> Result<Vec<u8>, StrategyError> {
        Ok(format.clone())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, StrategyError> {
        Ok(bytes.to_vec())
    }

    fn diff(&self, reference: &Vec<u8>, candidate: &Vec<u8>) -> Option<DiffReport> {
        if reference == candidate {
            return None;
        }

        let offset = reference
            .iter()
            .zip(candidate.iter())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| reference.len().min(candidate.len()));

        Some(DiffReport::new(format!(
            "binary snapshot differs from the reference ({} vs {} bytes, first difference at \
             offset {})",
            reference.len(),
            candidate.len(),
            offset
        )))
    }

    fn is_degenerate(&self, format: &Vec<u8>) -> bool {
        format.is_empty()
    }
}
