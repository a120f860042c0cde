//! Persistence for the last committed fingerprint.
//!
//! The on-disk format is the bare 64-character hex string, nothing else.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::fingerprint::Fingerprint;

/// Where the detector keeps its single fingerprint between runs.
///
/// A deployment with several watchers sharing one store would need an atomic
/// compare-and-swap here instead of a plain `save`.
pub trait FingerprintStore {
    /// Load the stored fingerprint. `Ok(None)` when nothing was stored yet.
    fn load(&self) -> StoreResult<Option<Fingerprint>>;

    /// Replace the stored fingerprint.
    fn save(&mut self, fingerprint: &Fingerprint) -> StoreResult<()>;
}

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    value: Option<Fingerprint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(fingerprint: Fingerprint) -> Self {
        MemoryStore {
            value: Some(fingerprint),
        }
    }
}

impl FingerprintStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<Fingerprint>> {
        Ok(self.value.clone())
    }

    fn save(&mut self, fingerprint: &Fingerprint) -> StoreResult<()> {
        self.value = Some(fingerprint.clone());
        Ok(())
    }
}

/// Single-file store, written atomically through a temp file and rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Delete the stored fingerprint. Returns false if there was none.
    pub fn clear(&self) -> StoreResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl FingerprintStore for FileStore {
    fn load(&self) -> StoreResult<Option<Fingerprint>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed.parse().map(Some).map_err(|e| match e {
            StoreError::Corrupt(msg) => {
                StoreError::Corrupt(format!("{} ({})", msg, self.path.display()))
            }
            other => other,
        })
    }

    fn save(&mut self, fingerprint: &Fingerprint) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        std::fs::write(&temp, fingerprint.as_str())?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}
