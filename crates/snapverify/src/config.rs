//! Process-wide verification settings.
//!
//! Two flags shared by every verifier in the process, both mutable at any
//! time and read fresh on each verification call:
//!
//! - a "record everything" switch that forces every call into recording
//!   mode, and
//! - an advisory diff-tool hint embedded in mismatch messages as a
//!   ready-to-paste compare command.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

static RECORD_ALL: AtomicBool = AtomicBool::new(false);
static DIFF_TOOL: RwLock<Option<String>> = RwLock::new(None);

/// Force every verification call into recording mode.
pub fn set_record_all(enabled: bool) {
    RECORD_ALL.store(enabled, Ordering::Relaxed);
}

/// Whether global recording is currently enabled.
pub fn record_all() -> bool {
    RECORD_ALL.load(Ordering::Relaxed)
}

/// Set the diff-tool hint, or clear it with `None`.
///
/// The hint is purely advisory: it is never executed, only embedded in
/// mismatch messages together with the reference and candidate paths.
pub fn set_diff_tool(tool: Option<String>) {
    let mut slot = DIFF_TOOL.write().unwrap_or_else(|e| e.into_inner());
    *slot = tool;
}

/// The currently configured diff-tool hint, if any.
pub fn diff_tool() -> Option<String> {
    DIFF_TOOL.read().unwrap_or_else(|e| e.into_inner()).clone()
}
