//! Snapshot verification engine.
//!
//! A snapshot test serializes a value through a pluggable [`Strategy`] and
//! compares the result against an on-disk reference:
//! - First run (or recording forced): the candidate is written under
//!   `Additions` for review and the call reports a recorded-new outcome.
//! - Later runs: the candidate is compared against `References`; a
//!   mismatch writes the candidate under `Changes` and reports the
//!   strategy's diff summary.
//! - Every run writes the fresh candidate under `Targets` so external
//!   tooling can diff whole test runs.
//!
//! # Example
//!
//! ```no_run
//! use snapverify::{CallSite, Verifier, VerifyOptions};
//! use std::sync::Arc;
//!
//! # use async_trait::async_trait;
//! # use snapverify::{DiffReport, Strategy, StrategyError};
//! # struct TextStrategy;
//! # #[async_trait]
//! # impl Strategy for TextStrategy {
//! #     type Value = String;
//! #     type Format = String;
//! #     async fn snapshot(&self, value: String) -> Result<String, StrategyError> { Ok(value) }
//! #     fn to_bytes(&self, f: &String) -> Result<Vec<u8>, StrategyError> { Ok(f.clone().into_bytes()) }
//! #     fn from_bytes(&self, b: &[u8]) -> Result<String, StrategyError> {
//! #         String::from_utf8(b.to_vec()).map_err(|e| StrategyError::with_source("not utf-8", e))
//! #     }
//! #     fn diff(&self, r: &String, c: &String) -> Option<DiffReport> {
//! #         (r != c).then(|| DiffReport::new("values differ"))
//! #     }
//! # }
//! # async fn example() {
//! let verifier = Verifier::new();
//! let outcome = verifier
//!     .verify(
//!         Arc::new(TextStrategy),
//!         || Ok(render_widget()),
//!         CallSite::new(file!(), "renders_empty_state"),
//!         VerifyOptions::new(),
//!     )
//!     .await;
//!
//! if let Some(message) = outcome.failure_message() {
//!     panic!("{message}");
//! }
//! # }
//! # fn render_widget() -> String { String::new() }
//! ```

pub mod config;
mod error;
mod generate;
mod identity;
mod store;
mod strategy;
mod verify;

pub use error::{StrategyError, VerifyError, VerifyResult};
pub use generate::DEFAULT_TIMEOUT;
pub use identity::{sanitize, CounterRegistry, SnapshotName};
pub use store::{ArtifactKind, ArtifactStore};
pub use strategy::{Attachment, DiffReport, Strategy};
pub use verify::{CallSite, Outcome, Verifier, VerifyOptions};
