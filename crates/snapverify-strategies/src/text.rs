//! Plain text snapshots.

use async_trait::async_trait;
use similar::{ChangeTag, TextDiff};
use snapverify::{Attachment, DiffReport, Strategy, StrategyError};

/// Snapshots UTF-8 text and compares it line by line.
///
/// Mismatches report a unified diff with three lines of context; the same
/// rendering is persisted as the difference artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStrategy;

impl TextStrategy {
    /// Create a text strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for TextStrategy {
    type Value = String;
    type Format = String;

    async fn snapshot(&self, value: String) -> Result<String, StrategyError> {
        Ok(value)
    }

    fn to_bytes(&self, format: &String) -> Result<Vec<u8>, StrategyError> {
        Ok(format.clone().into_bytes())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<String, StrategyError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| StrategyError::with_source("reference is not valid utf-8", e))
    }

    fn diff(&self, reference: &String, candidate: &String) -> Option<DiffReport> {
        if reference == candidate {
            return None;
        }

        let rendered = render_line_diff(reference, candidate);
        let report = DiffReport::new(format!(
            "text snapshot does not match the reference:\n{rendered}"
        ))
        .with_attachment(Attachment::new("diff", rendered.into_bytes()));
        Some(report)
    }

    fn difference(&self, reference: &String, candidate: &String) -> Option<String> {
        (reference != candidate).then(|| render_line_diff(reference, candidate))
    }

    fn file_extension(&self) -> Option<&str> {
        Some("txt")
    }
}

/// Render a unified line diff between two strings, three lines of context
/// per hunk.
pub(crate) fn render_line_diff(reference: &str, candidate: &str) -> String {
    let diff = TextDiff::from_lines(reference, candidate);
    let mut output = String::new();

    output.push_str("--- reference\n");
    output.push_str("+++ candidate\n");

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };

                output.push_str(sign);
                output.push_str(change.value());
                if !change.value().ends_with('\n') {
                    output.push('\n');
                }
            }
        }
    }

    output
}
