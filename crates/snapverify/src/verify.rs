//! The snapshot verification engine.

use crate::config;
use crate::error::{VerifyError, VerifyResult};
use crate::generate::{self, DEFAULT_TIMEOUT};
use crate::identity::{self, CounterRegistry, SnapshotName};
use crate::store::{ArtifactKind, ArtifactStore};
use crate::strategy::{Attachment, Strategy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a verification call originates.
///
/// The source file anchors snapshot-root discovery and contributes the
/// file prefix of the snapshot name; the test name contributes the middle
/// part and keys the unnamed-snapshot counter.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Source file containing the test, typically `file!()`.
    pub file: PathBuf,

    /// Name of the test function.
    pub test: String,
}

impl CallSite {
    /// Create a call site.
    pub fn new(file: impl Into<PathBuf>, test: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            test: test.into(),
        }
    }
}

/// Per-call settings for one verification run.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    name: Option<String>,
    record: bool,
    root_override: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl VerifyOptions {
    /// Default settings: unnamed snapshot, recording off, discovered
    /// snapshot root, default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name this snapshot instead of numbering it.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Force recording for this call, regardless of the global flag.
    pub fn record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Use an explicit snapshot root instead of project-root discovery.
    pub fn snapshot_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_override = Some(root.into());
        self
    }

    /// Bound the wait for snapshot generation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Outcome of one verification run.
#[derive(Debug)]
pub enum Outcome {
    /// The candidate matched the reference.
    Pass,

    /// No comparison took place; the candidate was recorded for review.
    /// Surfaced as a failed expectation so unreviewed recordings stay
    /// visible.
    RecordedNew {
        /// Instructions for promoting the recording into a reference.
        message: String,
    },

    /// The candidate differs from the reference.
    Mismatch {
        /// Strategy-provided summary, plus the diff-tool hint when one is
        /// configured.
        message: String,
        /// Artifacts the strategy attached to the failure report.
        attachments: Vec<Attachment>,
    },

    /// Verification could not complete.
    Error {
        /// Description of the underlying failure.
        message: String,
    },
}

impl Outcome {
    /// Whether the candidate matched its reference.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// The message a test harness should fail with, or `None` on pass.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::RecordedNew { message }
            | Self::Mismatch { message, .. }
            | Self::Error { message } => Some(message),
        }
    }

    /// Attachments collected for the failure report.
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            Self::Mismatch { attachments, .. } => attachments,
            _ => &[],
        }
    }
}

/// The verification engine.
///
/// Cheap to clone; clones share the unnamed-snapshot counter registry, so
/// one engine per test process keeps numbering consistent across threads.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    registry: Arc<CounterRegistry>,
}

impl Verifier {
    /// Create an engine with a fresh counter registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an existing registry.
    pub fn with_registry(registry: Arc<CounterRegistry>) -> Self {
        Self { registry }
    }

    /// Reset the unnamed-snapshot counters.
    ///
    /// The embedding test harness must call this between independent
    /// test-case executions so each case numbers its snapshots from 1.
    pub fn reset_counters(&self) {
        self.registry.reset();
    }

    /// Verify a value against its on-disk reference snapshot.
    ///
    /// The value thunk is invoked exactly once, after identity and
    /// directory resolution. Every failure inside the run, including I/O
    /// and decode errors, is converted into an [`Outcome`] rather than
    /// propagated, so callers never field an error from this method.
    pub async fn verify<S, F>(
        &self,
        strategy: Arc<S>,
        value: F,
        site: CallSite,
        options: VerifyOptions,
    ) -> Outcome
    where
        S: Strategy,
        F: FnOnce() -> anyhow::Result<S::Value>,
    {
        match self.verify_inner(strategy, value, &site, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Snapshot verification for {} failed: {}", site.test, e);
                Outcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    #[allow(clippy::cognitive_complexity)]
    async fn verify_inner<S, F>(
        &self,
        strategy: Arc<S>,
        value: F,
        site: &CallSite,
        options: VerifyOptions,
    ) -> VerifyResult<Outcome>
    where
        S: Strategy,
        F: FnOnce() -> anyhow::Result<S::Value>,
    {
        let store = ArtifactStore::resolve(&site.file, options.root_override.as_deref());
        let name = identity::resolve(
            &self.registry,
            &store.reference_dir(),
            &site.file,
            &site.test,
            options.name.as_deref(),
        );
        let extension = strategy.file_extension();

        let value = value().map_err(|e| VerifyError::Value(format!("{e:#}")))?;

        let timeout = options.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let candidate = generate::generate(Arc::clone(&strategy), value, timeout).await?;
        let candidate_bytes = strategy.to_bytes(&candidate)?;

        // Written on every run, before the outcome is known, so external
        // tooling can diff whole test runs.
        store
            .write(ArtifactKind::Target, &name, extension, &candidate_bytes)
            .await?;

        let reference_bytes = store.read_reference(&name, extension).await?;
        let recording = options.record || config::record_all();

        match reference_bytes {
            Some(bytes) if !recording => {
                compare(
                    strategy.as_ref(),
                    &store,
                    &name,
                    extension,
                    &bytes,
                    &candidate,
                    &candidate_bytes,
                )
                .await
            }
            reference => {
                record_new(
                    &store,
                    &name,
                    extension,
                    &candidate_bytes,
                    reference.is_some(),
                )
                .await
            }
        }
    }
}

/// Record the candidate under `Additions` and build the promotion message.
async fn record_new(
    store: &ArtifactStore,
    name: &SnapshotName,
    extension: Option<&str>,
    candidate_bytes: &[u8],
    reference_exists: bool,
) -> VerifyResult<Outcome> {
    let addition = store
        .write(ArtifactKind::Addition, name, extension, candidate_bytes)
        .await?;
    let reference = store.artifact_path(ArtifactKind::Reference, name, extension);

    info!("Recorded snapshot {} to {}", name, addition.display());

    let message = if reference_exists {
        format!(
            "Recorded snapshot to {} while recording is enabled. Move it to {} to accept it as \
             the reference, then re-run with recording off.",
            addition.display(),
            reference.display()
        )
    } else {
        format!(
            "No reference snapshot existed for this test. Recorded the candidate to {}. Review \
             it, move it to {} and re-run.",
            addition.display(),
            reference.display()
        )
    };

    Ok(Outcome::RecordedNew { message })
}

/// Compare the candidate against decoded reference bytes, persisting
/// mismatch artifacts.
async fn compare<S: Strategy>(
    strategy: &S,
    store: &ArtifactStore,
    name: &SnapshotName,
    extension: Option<&str>,
    reference_bytes: &[u8],
    candidate: &S::Format,
    candidate_bytes: &[u8],
) -> VerifyResult<Outcome> {
    let reference = strategy.from_bytes(reference_bytes)?;

    if strategy.is_degenerate(&reference) && strategy.is_degenerate(candidate) {
        debug!("Snapshot {name}: reference and candidate are both degenerate, treating as equal");
        return Ok(Outcome::Pass);
    }

    let Some(report) = strategy.diff(&reference, candidate) else {
        debug!("Snapshot {name} matches its reference");
        return Ok(Outcome::Pass);
    };

    let change = store
        .write(ArtifactKind::Change, name, extension, candidate_bytes)
        .await?;

    if let Some(difference) = strategy.difference(&reference, candidate) {
        let difference_bytes = strategy.to_bytes(&difference)?;
        store
            .write(ArtifactKind::Difference, name, extension, &difference_bytes)
            .await?;
    }

    let mut message = report.summary;
    if let Some(tool) = config::diff_tool() {
        let reference_path = store.artifact_path(ArtifactKind::Reference, name, extension);
        message.push_str(&format!(
            "\ncompare with: {} \"{}\" \"{}\"",
            tool,
            reference_path.display(),
            change.display()
        ));
    }

    warn!("Snapshot {name} does not match its reference");

    Ok(Outcome::Mismatch {
        message,
        attachments: report.attachments,
    })
}
