//! Leaderboard storage backends
//!
//! Features:
//! - Plain JSON array file (`[{"name": .., "score": ..}, ..]`)
//! - Atomic replace (write tmp, then rename over the old file)
//! - A missing file reads as the seeded default leaderboard (nothing is written)
//! - In-memory store with failure injection for tests

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::highscores::{ScoreEntry, fallback_scores};

/// Raw leaderboard storage. Ordering and truncation are the service's job.
pub trait ScoreStore: Send {
    fn load(&self) -> Result<Vec<ScoreEntry>, StorageError>;
    fn save(&mut self, entries: &[ScoreEntry]) -> Result<(), StorageError>;
}

/// Leaderboard kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<Vec<ScoreEntry>, StorageError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No leaderboard at {}, using the default board", self.path.display());
                return Ok(fallback_scores());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, entries: &[ScoreEntry]) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Leaderboard saved ({} entries)", entries.len());
        Ok(())
    }
}

/// Shared in-memory leaderboard. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: Vec<ScoreEntry>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        let store = Self::new();
        store.lock().entries = entries;
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // Ignore poisoning
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// What is actually stored, bypassing failure injection
    pub fn entries(&self) -> Vec<ScoreEntry> {
        self.lock().entries.clone()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<Vec<ScoreEntry>, StorageError> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(StorageError::Unavailable);
        }
        Ok(inner.entries.clone())
    }

    fn save(&mut self, entries: &[ScoreEntry]) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::Unavailable);
        }
        inner.entries = entries.to_vec();
        Ok(())
    }
}
