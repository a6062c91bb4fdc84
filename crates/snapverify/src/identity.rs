//! Snapshot identity resolution.
//!
//! A snapshot's identity is `(source file, test name, discriminator)`. The
//! discriminator is either a caller-supplied name or, for unnamed
//! snapshots, a per-`(references directory, test)` counter so that several
//! calls from the same test each get their own stable file.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// Static pattern for runs of non-word characters, compiled once.
static NON_WORD: OnceLock<Regex> = OnceLock::new();

fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| {
        Regex::new(r"\W+").expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Substitute for names that sanitize down to nothing.
const EMPTY_NAME: &str = "unnamed";

/// Make a string safe for use inside a snapshot file name.
///
/// Runs of non-word characters collapse into a single `-`, leading and
/// trailing separators are trimmed, and an otherwise-empty result becomes
/// `"unnamed"`. Idempotent, never empty, never contains path separators.
pub fn sanitize(input: &str) -> String {
    let collapsed = non_word().replace_all(input, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        EMPTY_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A fully composed, filesystem-safe snapshot file name (no extension).
///
/// The shape is `<file prefix>.<test>.<discriminator>`, every part
/// sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotName(String);

impl SnapshotName {
    /// Compose a name from a source file, test name, and discriminator.
    pub fn compose(source_file: &Path, test: &str, discriminator: &str) -> Self {
        let prefix = source_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self(format!(
            "{}.{}.{}",
            sanitize(prefix),
            sanitize(test),
            sanitize(discriminator)
        ))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the snapshot name for a call site.
///
/// An explicit name is sanitized and used verbatim as the discriminator.
/// Without one, the registry counter for `(reference_dir, test)` is bumped
/// and its value used, so repeated unnamed calls from one test number
/// themselves `1, 2, 3, ...` in call order.
pub fn resolve(
    registry: &CounterRegistry,
    reference_dir: &Path,
    source_file: &Path,
    test: &str,
    explicit: Option<&str>,
) -> SnapshotName {
    let discriminator = match explicit {
        Some(name) => sanitize(name),
        None => registry.next(reference_dir, test).to_string(),
    };
    SnapshotName::compose(source_file, test, &discriminator)
}

/// Counters for unnamed snapshots, keyed by `(references directory, test)`.
///
/// Owned by the verification engine and shared via `Arc` when several
/// verifiers must agree on numbering. All access - increments and resets -
/// serializes through one mutex, so concurrent callers never observe the
/// same value for a key and a reset never interleaves with an increment.
#[derive(Debug, Default)]
pub struct CounterRegistry {
    counters: Mutex<HashMap<(PathBuf, String), u32>>,
}

impl CounterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically increment and return the counter for a key.
    ///
    /// The first call for a key yields 1.
    pub fn next(&self, reference_dir: &Path, test: &str) -> u32 {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let counter = counters
            .entry((reference_dir.to_path_buf(), test.to_string()))
            .or_insert(0);
        *counter += 1;
        *counter
    }

    /// Clear every counter.
    ///
    /// The embedding test harness calls this between independent test-case
    /// runs so re-running a single case reproduces the same discriminator
    /// sequence.
    pub fn reset(&self) {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
