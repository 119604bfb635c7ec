//! Durable JSON document store
//!
//! Every write goes to a temporary file in the target's directory, is
//! flushed and fsynced, then renamed over the target. A reader therefore
//! sees either the old or the new document, never a torn one. Reads always
//! hit the disk.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::StoreLock;
use shared::{process_debug, process_warn, ProcessId};

const TEMP_PREFIX: &str = ".";
const TEMP_SUFFIX: &str = ".tmp";

/// Directory of small JSON documents addressed by file name
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Load a document, falling back to `T::default()` when it is missing or unreadable
    pub fn read_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.read_or(key, T::default)
    }

    /// Load a document, falling back to `fallback()` when it is missing or unreadable
    pub fn read_or<T, F>(&self, key: &str, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.path_for(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                process_debug!(ProcessId::current(), "No document at {}, using default", path.display());
                return fallback();
            }
            Err(e) => {
                process_warn!(
                    ProcessId::current(),
                    kind = "StateCorruptionWarning",
                    "Could not read {}: {}. Using default.",
                    path.display(),
                    e
                );
                return fallback();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                process_warn!(
                    ProcessId::current(),
                    kind = "StateCorruptionWarning",
                    "Document {} is corrupt ({}). Using default.",
                    path.display(),
                    e
                );
                fallback()
            }
        }
    }

    /// Replace a document atomically
    pub fn write<T: Serialize>(&self, key: &str, document: &T) -> OrchestratorResult<()> {
        let path = self.path_for(key);
        let io_error = |operation: &'static str| {
            let path = path.clone();
            move |source: std::io::Error| OrchestratorError::StateStoreError { operation, path, source }
        };

        std::fs::create_dir_all(&self.dir).map_err(io_error("create directory"))?;

        let mut temp = tempfile::Builder::new()
            .prefix(&format!("{TEMP_PREFIX}{key}."))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(io_error("create temp file"))?;

        // Serialize before touching the target so a failure leaves it untouched
        let body = serde_json::to_vec_pretty(document)?;
        temp.write_all(&body).map_err(io_error("write"))?;
        temp.flush().map_err(io_error("flush"))?;
        temp.as_file().sync_all().map_err(io_error("fsync"))?;

        temp.persist(&path).map_err(|e| OrchestratorError::StateStoreError {
            operation: "rename",
            path: path.clone(),
            source: e.error,
        })?;

        process_debug!(ProcessId::current(), "Wrote {} ({} bytes)", path.display(), body.len());
        Ok(())
    }

    /// Remove temp files of `key` left behind by writes that never reached the rename
    ///
    /// Runs under the key's store lock, which every writer holds across its
    /// write. A busy lock means a live write owns the temp file, so the key is
    /// skipped.
    pub fn sweep_stale_temp_files(&self, key: &str, lock: &dyn StoreLock) -> OrchestratorResult<usize> {
        let Some(_guard) = lock.try_acquire()? else {
            process_debug!(ProcessId::current(), "Skipping temp sweep for {}: {} is held", key, lock.describe());
            return Ok(0);
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{TEMP_PREFIX}{key}.");
        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(TEMP_SUFFIX) && entry.path().is_file() {
                std::fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        if removed > 0 {
            process_warn!(
                ProcessId::current(),
                "Removed {} stale temp file(s) of {} from {}",
                removed,
                key,
                self.dir.display()
            );
        }
        Ok(removed)
    }
}
