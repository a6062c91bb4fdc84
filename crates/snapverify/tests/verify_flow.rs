//! End-to-end verification flow tests.
//!
//! Each test uses its own temporary snapshot root, seeding reference
//! files directly on disk where a baseline is needed.

use async_trait::async_trait;
use snapverify::{
    Attachment, CallSite, DiffReport, Outcome, Strategy, StrategyError, Verifier, VerifyOptions,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const SOURCE_FILE: &str = "/src/widget_tests.rs";

/// Plain text snapshots, newline-separated.
struct LineText;

#[async_trait]
impl Strategy for LineText {
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
        (reference != candidate).then(|| {
            DiffReport::new("values differ")
                .with_attachment(Attachment::new("candidate", candidate.clone().into_bytes()))
        })
    }

    fn file_extension(&self) -> Option<&str> {
        Some("txt")
    }
}

/// A producer that never completes.
struct Stalling;

#[async_trait]
impl Strategy for Stalling {
    type Value = ();
    type Format = String;

    async fn snapshot(&self, _value: ()) -> Result<String, StrategyError> {
        std::future::pending().await
    }

    fn to_bytes(&self, format: &String) -> Result<Vec<u8>, StrategyError> {
        Ok(format.clone().into_bytes())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<String, StrategyError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| StrategyError::with_source("reference is not valid utf-8", e))
    }

    fn diff(&self, _reference: &String, _candidate: &String) -> Option<DiffReport> {
        None
    }
}

/// Byte snapshots that treat empty buffers as degenerate and whose diff
/// reports a mismatch unconditionally, so a pass proves diff was skipped.
struct EmptyAware;

#[async_trait]
impl Strategy for EmptyAware {
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

    fn diff(&self, _reference: &Vec<u8>, _candidate: &Vec<u8>) -> Option<DiffReport> {
        Some(DiffReport::new("bytes differ"))
    }

    fn is_degenerate(&self, format: &Vec<u8>) -> bool {
        format.is_empty()
    }
}

fn options_for(root: &TempDir) -> VerifyOptions {
    VerifyOptions::new().snapshot_root(root.path())
}

/// Seed a reference file for a named snapshot of `LineText`.
fn seed_text_reference(root: &TempDir, test: &str, name: &str, content: &str) -> PathBuf {
    let references = root.path().join("References");
    fs::create_dir_all(&references).expect("Failed to create References");
    let path = references.join(format!("widget_tests.{test}.{name}.txt"));
    fs::write(&path, content).expect("Failed to seed reference");
    path
}

/// Test that a first run records the candidate and promotion makes the
/// next run pass.
#[tokio::test]
async fn test_record_then_promote_then_pass() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let verifier = Verifier::new();
    let site = CallSite::new(SOURCE_FILE, "promotes");

    let outcome = verifier
        .verify(
            Arc::new(LineText),
            || Ok("line 1\nline 2\n".to_string()),
            site.clone(),
            options_for(&root),
        )
        .await;

    let message = outcome.failure_message().expect("first run must not pass");
    assert!(message.contains("No reference snapshot existed"));

    // The addition must be byte-identical to the encoded candidate.
    let addition = root.path().join("Additions/widget_tests.promotes.1.txt");
    assert_eq!(fs::read(&addition).unwrap(), b"line 1\nline 2\n");

    // Promote the addition, reset counters as a harness would between
    // test-case executions, and run again.
    let reference = root.path().join("References/widget_tests.promotes.1.txt");
    fs::create_dir_all(reference.parent().unwrap()).unwrap();
    fs::copy(&addition, &reference).unwrap();
    verifier.reset_counters();

    let outcome = verifier
        .verify(
            Arc::new(LineText),
            || Ok("line 1\nline 2\n".to_string()),
            site,
            options_for(&root),
        )
        .await;

    assert!(outcome.is_pass(), "expected pass, got {outcome:?}");
    assert!(outcome.failure_message().is_none());
}

/// Test that a mismatch reports the diff summary and copies the
/// candidate to Changes without touching the reference.
#[tokio::test]
async fn test_mismatch_writes_change_copy() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let reference = seed_text_reference(&root, "differs", "case", "old content");

    let outcome = Verifier::new()
        .verify(
            Arc::new(LineText),
            || Ok("new content".to_string()),
            CallSite::new(SOURCE_FILE, "differs"),
            options_for(&root).named("case"),
        )
        .await;

    let message = outcome.failure_message().expect("mismatch must not pass");
    assert!(message.contains("values differ"));
    assert_eq!(outcome.attachments().len(), 1);
    assert_eq!(outcome.attachments()[0].name, "candidate");

    let change = root.path().join("Changes/widget_tests.differs.case.txt");
    assert_eq!(fs::read(change).unwrap(), b"new content");
    assert_eq!(fs::read(reference).unwrap(), b"old content");
}

/// Test that passing runs still write the target copy.
#[tokio::test]
async fn test_pass_still_writes_target() {
    let root = TempDir::new().expect("Failed to create temp dir");
    seed_text_reference(&root, "targets", "case", "content");

    let outcome = Verifier::new()
        .verify(
            Arc::new(LineText),
            || Ok("content".to_string()),
            CallSite::new(SOURCE_FILE, "targets"),
            options_for(&root).named("case"),
        )
        .await;

    assert!(outcome.is_pass(), "expected pass, got {outcome:?}");
    let target = root.path().join("Targets/widget_tests.targets.case.txt");
    assert_eq!(fs::read(target).unwrap(), b"content");
}

/// Test that per-call recording records the candidate and leaves the
/// existing reference untouched.
#[tokio::test]
async fn test_explicit_record_leaves_reference_untouched() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let reference = seed_text_reference(&root, "rerecords", "case", "old content");

    let outcome = Verifier::new()
        .verify(
            Arc::new(LineText),
            || Ok("new content".to_string()),
            CallSite::new(SOURCE_FILE, "rerecords"),
            options_for(&root).named("case").record(true),
        )
        .await;

    let message = outcome.failure_message().expect("recording must not pass");
    assert!(message.contains("recording is enabled"));

    let addition = root.path().join("Additions/widget_tests.rerecords.case.txt");
    assert_eq!(fs::read(addition).unwrap(), b"new content");
    assert_eq!(fs::read(reference).unwrap(), b"old content");
}

/// Test that named snapshots bypass the unnamed counter.
#[tokio::test]
async fn test_named_snapshots_skip_counter() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let verifier = Verifier::new();
    let site = CallSite::new(SOURCE_FILE, "mixed");

    verifier
        .verify(
            Arc::new(LineText),
            || Ok("named".to_string()),
            site.clone(),
            options_for(&root).named("empty state"),
        )
        .await;
    verifier
        .verify(
            Arc::new(LineText),
            || Ok("unnamed".to_string()),
            site,
            options_for(&root),
        )
        .await;

    let additions = root.path().join("Additions");
    assert!(additions.join("widget_tests.mixed.empty-state.txt").exists());
    assert!(additions.join("widget_tests.mixed.1.txt").exists());
}

/// Test that concurrent unnamed calls at one site number themselves as a
/// permutation of 1..=N.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_unnamed_calls_permutation() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let verifier = Verifier::new();
    let strategy = Arc::new(LineText);

    let mut handles = Vec::new();
    for i in 0..8 {
        let verifier = verifier.clone();
        let strategy = Arc::clone(&strategy);
        let snapshot_root = root.path().to_path_buf();
        handles.push(tokio::spawn(async move {
            verifier
                .verify(
                    strategy,
                    move || Ok(format!("call {i}")),
                    CallSite::new(SOURCE_FILE, "concurrent"),
                    VerifyOptions::new().snapshot_root(snapshot_root),
                )
                .await
        }));
    }

    for handle in futures::future::join_all(handles).await {
        let outcome = handle.expect("verify task panicked");
        assert!(
            matches!(outcome, Outcome::RecordedNew { .. }),
            "expected RecordedNew, got {outcome:?}"
        );
    }

    let additions = root.path().join("Additions");
    for discriminator in 1..=8 {
        let path = additions.join(format!("widget_tests.concurrent.{discriminator}.txt"));
        assert!(path.exists(), "missing discriminator {discriminator}");
    }
    assert_eq!(fs::read_dir(&additions).unwrap().count(), 8);
}

/// Test that a stalled producer yields a timeout outcome within a
/// bounded wall-clock margin.
#[tokio::test]
async fn test_timeout_outcome_is_bounded() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let started = Instant::now();

    let outcome = Verifier::new()
        .verify(
            Arc::new(Stalling),
            || Ok(()),
            CallSite::new(SOURCE_FILE, "stalls"),
            options_for(&root).timeout(Duration::from_millis(10)),
        )
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    let message = outcome.failure_message().expect("timeout must not pass");
    assert!(message.contains("timed out"));
    assert!(message.contains("10ms"));
}

/// Test that two degenerate formats compare equal even though the
/// strategy's diff would report a mismatch.
#[tokio::test]
async fn test_degenerate_formats_compare_equal() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let references = root.path().join("References");
    fs::create_dir_all(&references).unwrap();
    fs::write(references.join("widget_tests.degenerate.case"), b"").unwrap();

    let verifier = Verifier::new();
    let outcome = verifier
        .verify(
            Arc::new(EmptyAware),
            || Ok(Vec::new()),
            CallSite::new(SOURCE_FILE, "degenerate"),
            options_for(&root).named("case"),
        )
        .await;
    assert!(outcome.is_pass(), "expected pass, got {outcome:?}");

    // Non-degenerate content must still go through diff, which always
    // reports a mismatch for this strategy.
    fs::write(references.join("widget_tests.degenerate.full"), b"abc").unwrap();
    let outcome = verifier
        .verify(
            Arc::new(EmptyAware),
            || Ok(b"abc".to_vec()),
            CallSite::new(SOURCE_FILE, "degenerate"),
            options_for(&root).named("full"),
        )
        .await;
    let message = outcome.failure_message().expect("diff must run here");
    assert!(message.contains("bytes differ"));
}

/// Test that a configured diff tool is surfaced in mismatch messages.
#[tokio::test]
async fn test_diff_tool_hint_in_mismatch_message() {
    let root = TempDir::new().expect("Failed to create temp dir");
    seed_text_reference(&root, "hints", "case", "old content");

    snapverify::config::set_diff_tool(Some("opendiff".to_string()));
    let outcome = Verifier::new()
        .verify(
            Arc::new(LineText),
            || Ok("new content".to_string()),
            CallSite::new(SOURCE_FILE, "hints"),
            options_for(&root).named("case"),
        )
        .await;
    snapverify::config::set_diff_tool(None);

    let message = outcome.failure_message().expect("mismatch must not pass");
    assert!(message.contains("values differ"));
    assert!(message.contains("compare with: opendiff"));
    assert!(message.contains("Changes"));
}
