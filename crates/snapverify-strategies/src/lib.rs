//! Built-in snapshot strategies for snapverify.
//!
//! - [`TextStrategy`]: UTF-8 text, line-by-line unified diffs.
//! - [`JsonStrategy`]: `serde_json::Value`s, structural comparison over
//!   pretty-printed storage.
//! - [`BytesStrategy`]: raw byte buffers, exact comparison, no file
//!   extension.
//!
//! # Example
//!
//! ```no_run
//! use snapverify::{CallSite, Verifier, VerifyOptions};
//! use snapverify_strategies::TextStrategy;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let verifier = Verifier::new();
//! let outcome = verifier
//!     .verify(
//!         Arc::new(TextStrategy::new()),
//!         || Ok("rendered output".to_string()),
//!         CallSite::new(file!(), "renders_output"),
//!         VerifyOptions::new(),
//!     )
//!     .await;
//! assert!(outcome.is_pass(), "{:?}", outcome.failure_message());
//! # }
//! ```

mod bytes;
mod json;
mod text;

pub use bytes::BytesStrategy;
pub use json::JsonStrategy;
pub use text::TextStrategy;
