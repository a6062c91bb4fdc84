//! On-disk layout and I/O for snapshot artifacts.

use crate::error::VerifyResult;
use crate::identity::SnapshotName;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Directory entries that identify a project root while walking upward
/// from a source file.
const ROOT_MARKERS: &[&str] = &[
    ".git",
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
];

/// The artifact classes a verification run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Accepted baseline a candidate is compared against.
    Reference,
    /// Freshly generated output, written on every run regardless of outcome.
    Target,
    /// Newly recorded candidate awaiting review and promotion.
    Addition,
    /// Candidate that did not match its reference.
    Change,
    /// Strategy-rendered difference between reference and candidate.
    Difference,
}

impl ArtifactKind {
    /// Directory name under the snapshot root.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Reference => "References",
            Self::Target => "Targets",
            Self::Addition => "Additions",
            Self::Change => "Changes",
            Self::Difference => "Differences",
        }
    }
}

/// Artifact file I/O rooted at one snapshot directory.
///
/// The root holds five sibling directories, one per [`ArtifactKind`],
/// created lazily on first write.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store over an explicit root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the snapshot root for a source file.
    ///
    /// An explicit override wins outright. Otherwise parent directories of
    /// the source file are walked until one contains a project-root marker;
    /// if none does, snapshots are kept beside the source file.
    pub fn resolve(source_file: &Path, override_dir: Option<&Path>) -> Self {
        if let Some(dir) = override_dir {
            return Self::new(dir);
        }

        let start = source_file.parent().unwrap_or_else(|| Path::new("."));
        match find_project_root(start) {
            Some(root) => Self::new(root),
            None => {
                debug!(
                    source = %source_file.display(),
                    "no project root marker found, keeping snapshots beside the source file"
                );
                Self::new(start)
            }
        }
    }

    /// The resolved snapshot root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the references directory, whether or not it exists yet.
    pub fn reference_dir(&self) -> PathBuf {
        self.root.join(ArtifactKind::Reference.directory())
    }

    /// Full path of an artifact file.
    ///
    /// The extension is appended textually: snapshot names contain dots,
    /// so `Path::set_extension` would eat part of the identity.
    pub fn artifact_path(
        &self,
        kind: ArtifactKind,
        name: &SnapshotName,
        extension: Option<&str>,
    ) -> PathBuf {
        let file_name = match extension {
            Some(ext) => format!("{name}.{ext}"),
            None => name.as_str().to_string(),
        };
        self.root.join(kind.directory()).join(file_name)
    }

    /// Write an artifact, creating its directory if needed and overwriting
    /// any previous file. Returns the path written.
    pub async fn write(
        &self,
        kind: ArtifactKind,
        name: &SnapshotName,
        extension: Option<&str>,
        bytes: &[u8],
    ) -> VerifyResult<PathBuf> {
        let path = self.artifact_path(kind, name, extension);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            "wrote snapshot artifact"
        );
        Ok(path)
    }

    /// Read the reference bytes for a name, or `None` when no reference
    /// has been recorded yet.
    pub async fn read_reference(
        &self,
        name: &SnapshotName,
        extension: Option<&str>,
    ) -> VerifyResult<Option<Vec<u8>>> {
        let path = self.artifact_path(ArtifactKind::Reference, name, extension);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Walk from `start` toward the filesystem root, returning the first
/// directory containing a recognized project marker.
fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if ROOT_MARKERS.iter().any(|m| current.join(m).exists()) {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
