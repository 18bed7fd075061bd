//! Error types for hashing, staging and project initialization
//!
//! Each stage has its own error so callers can decide what is fatal:
//! the initializer degrades on [`FingerprintError`] and aborts on the rest.

use crate::project::InitPhase;
use crate::staging::TargetKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to compute, load or store the library fingerprint
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("tracked library directory not found: {}", .0.display())]
    MissingLibraryDir(PathBuf),

    #[error("tracked library directory contains no files: {}", .0.display())]
    EmptyLibraryDir(PathBuf),

    #[error("failed to read library input {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk library directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to load stored fingerprint {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored fingerprint {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to save fingerprint {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while unpacking an archive or applying overlays
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("archive not found: {}", .0.display())]
    ArchiveMissing(PathBuf),

    #[error("failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {} contains an entry outside the destination: {entry}", archive.display())]
    UnsafeEntry { archive: PathBuf, entry: String },

    #[error("overlay source not found: {}", .0.display())]
    OverlayMissing(PathBuf),

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StagingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure while materializing the deployment configuration
#[derive(Debug, Error)]
pub enum ConfigWriteError {
    #[error("failed to read deployment config template {}: {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deployment config template {} is invalid: {source}", path.display())]
    InvalidTemplate {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize default deployment config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("failed to write deployment config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by [`crate::project::Initializer`]
#[derive(Debug, Error)]
pub enum InitError {
    #[error(
        "Project name `{name}` already exists at {}. Use -f or --force to forcefully update the project directory.",
        path.display()
    )]
    AlreadyExists { name: String, path: PathBuf },

    #[error("failed to remove existing project {}: {source}", path.display())]
    RemoveExisting {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to discard stale {kind} target {}: {source}", path.display())]
    Invalidate {
        kind: TargetKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} failed: {source}")]
    Staging {
        phase: InitPhase,
        #[source]
        source: StagingError,
    },

    #[error("failed to create project directory {}: {source}", path.display())]
    Scaffold {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error while writing deployment configuration: {0}")]
    ConfigWrite(#[from] ConfigWriteError),
}

impl InitError {
    /// Phase of the run in which this error ended the initialization
    pub fn phase(&self) -> InitPhase {
        match self {
            Self::AlreadyExists { .. } | Self::RemoveExisting { .. } => InitPhase::Validating,
            Self::Invalidate { .. } => InitPhase::Invalidating,
            Self::Staging { phase, .. } => *phase,
            Self::Scaffold { .. } => InitPhase::ScaffoldingDirs,
            Self::ConfigWrite(_) => InitPhase::WritingConfig,
        }
    }
}
