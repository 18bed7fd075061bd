//! Change detection for the bundled gateway libraries
//!
//! The tracked directory is hashed in a stable (file-name sorted) order so the
//! same contents always produce the same fingerprint. Detection never writes;
//! the fingerprint is recorded only once staging has completed.

pub mod store;

use crate::config::GatewayLayout;
use crate::error::FingerprintError;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub use store::FingerprintStore;

pub(crate) const ALGORITHM: &str = "blake3";

/// Opaque digest of the tracked library contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryFingerprint(blake3::Hash);

impl LibraryFingerprint {
    pub(crate) fn to_hex(self) -> String {
        self.0.to_hex().to_string()
    }

    pub(crate) fn from_hex(hex: &str) -> Result<Self, blake3::HexError> {
        blake3::Hash::from_hex(hex).map(Self)
    }
}

/// Decides whether staged targets are stale
#[derive(Debug, Clone)]
pub struct HashTracker {
    tracked_dir: PathBuf,
    store: FingerprintStore,
}

impl HashTracker {
    pub fn new(layout: &GatewayLayout) -> Self {
        Self::with_store(layout.tracked_dir(), FingerprintStore::new(layout.fingerprint_file()))
    }

    pub fn with_store(tracked_dir: impl Into<PathBuf>, store: FingerprintStore) -> Self {
        Self {
            tracked_dir: tracked_dir.into(),
            store,
        }
    }

    /// Hash every regular file under the tracked directory
    pub fn compute(&self) -> Result<LibraryFingerprint, FingerprintError> {
        let root = &self.tracked_dir;
        if !root.is_dir() {
            return Err(FingerprintError::MissingLibraryDir(root.clone()));
        }

        let mut hasher = blake3::Hasher::new();
        let mut files = 0usize;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| FingerprintError::Walk {
                path: root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            hash_file(&mut hasher, root, entry.path())?;
            files += 1;
        }

        if files == 0 {
            return Err(FingerprintError::EmptyLibraryDir(root.clone()));
        }

        debug!(dir = %root.display(), files, "computed library fingerprint");
        Ok(LibraryFingerprint(hasher.finalize()))
    }

    /// True when the libraries differ from the last recorded staging, or when
    /// nothing was recorded yet
    pub fn detect_changes(&self) -> Result<bool, FingerprintError> {
        self.compare().map(|(changed, _)| changed)
    }

    /// Like [`Self::detect_changes`], also returning the computed fingerprint
    /// so it can be recorded after a successful staging
    pub fn compare(&self) -> Result<(bool, LibraryFingerprint), FingerprintError> {
        let current = self.compute()?;
        let stored = self.store.load()?;
        Ok((stored != Some(current), current))
    }

    pub fn record(&self, fingerprint: &LibraryFingerprint) -> Result<(), FingerprintError> {
        self.store.save(fingerprint)
    }
}

/// Feed a file's relative path, length and contents into the hasher
fn hash_file(hasher: &mut blake3::Hasher, root: &Path, path: &Path) -> Result<(), FingerprintError> {
    let read_err = |source: io::Error| FingerprintError::Read {
        path: path.to_path_buf(),
        source,
    };

    let relative = path.strip_prefix(root).unwrap_or(path);
    let name = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let mut file = File::open(path).map_err(read_err)?;
    let len = file.metadata().map_err(read_err)?.len();

    hasher.update(name.as_bytes());
    hasher.update(&[0]);
    hasher.update(&len.to_le_bytes());
    io::copy(&mut file, hasher).map_err(read_err)?;
    Ok(())
}
