//! Durable progress store
//!
//! `FileProgressStore` keeps the checkpoint in a single JSON file. Commits
//! are crash-safe: the new checkpoint is written to a sibling temp file,
//! fsynced, and atomically renamed over the target, so a crawl killed
//! mid-commit always leaves either the old checkpoint or the new one —
//! never a torn file.

use crate::checkpoint::types::{CrawlCheckpoint, CHECKPOINT_VERSION};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during checkpoint store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unsupported checkpoint version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for checkpoint persistence backends
pub trait ProgressStore {
    /// Loads the persisted checkpoint, if one exists
    fn load(&mut self) -> StoreResult<Option<CrawlCheckpoint>>;

    /// Durably commits a checkpoint
    ///
    /// Atomic: either the full checkpoint lands, or the prior one remains
    /// intact.
    fn commit(&mut self, checkpoint: &CrawlCheckpoint) -> StoreResult<()>;

    /// Whether an item id is recorded as persisted in the committed state
    fn contains_item(&self, id: &str) -> bool;
}

/// JSON-file-backed progress store
pub struct FileProgressStore {
    path: PathBuf,
    known_ids: HashSet<String>,
}

impl FileProgressStore {
    /// Creates a store over the given checkpoint path
    ///
    /// Nothing is read until `load()`; a missing file simply means a fresh
    /// crawl.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileProgressStore {
            path: path.as_ref().to_path_buf(),
            known_ids: HashSet::new(),
        }
    }

    /// Path of the checkpoint file
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
}

impl ProgressStore for FileProgressStore {
    fn load(&mut self) -> StoreResult<Option<CrawlCheckpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let checkpoint: CrawlCheckpoint = serde_json::from_str(&content)?;

        if checkpoint.version > CHECKPOINT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        self.known_ids = checkpoint.persisted_item_ids.iter().cloned().collect();
        tracing::info!(
            path = %self.path.display(),
            pages_completed = checkpoint.pages_completed,
            items = self.known_ids.len(),
            "loaded checkpoint"
        );

        Ok(Some(checkpoint))
    }

    fn commit(&mut self, checkpoint: &CrawlCheckpoint) -> StoreResult<()> {
        let serialized = serde_json::to_vec_pretty(checkpoint)?;

        // Temp file lives in the same directory so the rename stays on one
        // filesystem and is atomic.
        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            file.write_all(&serialized)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        self.known_ids = checkpoint.persisted_item_ids.iter().cloned().collect();
        tracing::debug!(
            path = %self.path.display(),
            pages_completed = checkpoint.pages_completed,
            "committed checkpoint"
        );

        Ok(())
    }

    fn contains_item(&self, id: &str) -> bool {
        self.known_ids.contains(id)
    }
}
