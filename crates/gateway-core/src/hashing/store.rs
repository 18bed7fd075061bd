//! Persisted fingerprint record under the tool state directory

use super::{LibraryFingerprint, ALGORITHM};
use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct FingerprintRecord {
    algorithm: String,
    digest: String,
}

/// Loads and saves the fingerprint of the last successful staging
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been recorded yet
    pub fn load(&self) -> Result<Option<LibraryFingerprint>, FingerprintError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(FingerprintError::Load {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record: FingerprintRecord =
            serde_yaml::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        if record.algorithm != ALGORITHM {
            return Err(self.corrupt(format!("unsupported algorithm '{}'", record.algorithm)));
        }

        LibraryFingerprint::from_hex(&record.digest)
            .map(Some)
            .map_err(|e| self.corrupt(e.to_string()))
    }

    pub fn save(&self, fingerprint: &LibraryFingerprint) -> Result<(), FingerprintError> {
        let record = FingerprintRecord {
            algorithm: ALGORITHM.to_string(),
            digest: fingerprint.to_hex(),
        };
        let content = serde_yaml::to_string(&record).map_err(|e| self.corrupt(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| FingerprintError::Save {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| FingerprintError::Save {
            path: self.path.clone(),
            source,
        })
    }

    fn corrupt(&self, reason: String) -> FingerprintError {
        FingerprintError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
