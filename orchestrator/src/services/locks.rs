//! Key-scoped mutual exclusion for the state store
//!
//! Two flavours share the [`StoreLock`] seam: an advisory `flock` on a
//! sidecar `<file>.lock`, which also excludes other processes on the same
//! host, and a process-wide mutex for single-process deployments.

use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{LockGuard, StoreLock};

/// How store files are protected, chosen by `LOCK_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    #[default]
    Advisory,
    Process,
}

impl FromStr for LockMode {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "advisory" | "file" => Ok(LockMode::Advisory),
            "process" | "mutex" => Ok(LockMode::Process),
            other => Err(OrchestratorError::config(format!(
                "unknown LOCK_MODE '{other}' (expected advisory | process)"
            ))),
        }
    }
}

impl std::fmt::Display for LockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockMode::Advisory => write!(f, "advisory"),
            LockMode::Process => write!(f, "process"),
        }
    }
}

/// Build the lock guarding the document at `path`
pub fn lock_for(mode: LockMode, path: &Path) -> Arc<dyn StoreLock> {
    match mode {
        LockMode::Advisory => Arc::new(AdvisoryFileLock::for_document(path)),
        LockMode::Process => Arc::new(ProcessLock::for_path(path)),
    }
}

/// In-process mutex shared by every handle to the same path
#[derive(Clone)]
pub struct ProcessLock {
    path: PathBuf,
    mutex: Arc<Mutex<()>>,
}

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

impl ProcessLock {
    pub fn for_path(path: &Path) -> Self {
        let mutex = registry()
            .lock()
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            path: path.to_path_buf(),
            mutex,
        }
    }
}

impl StoreLock for ProcessLock {
    fn acquire(&self) -> OrchestratorResult<LockGuard> {
        Ok(LockGuard::new(self.mutex.lock_arc()))
    }

    fn try_acquire(&self) -> OrchestratorResult<Option<LockGuard>> {
        Ok(self.mutex.try_lock_arc().map(LockGuard::new))
    }

    fn describe(&self) -> String {
        format!("process mutex for {}", self.path.display())
    }
}

/// Exclusive `flock` on a sidecar lock file
#[derive(Debug, Clone)]
pub struct AdvisoryFileLock {
    lock_path: PathBuf,
}

struct FileLockGuard {
    file: File,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl AdvisoryFileLock {
    /// Lock guarding `document`, stored next to it as `<document>.lock`
    pub fn for_document(document: &Path) -> Self {
        let mut name = document
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        Self {
            lock_path: document.with_file_name(name),
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn lock_error(&self, e: std::io::Error) -> OrchestratorError {
        OrchestratorError::LockError {
            path: self.lock_path.clone(),
            message: e.to_string(),
        }
    }

    fn open(&self) -> OrchestratorResult<File> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.lock_error(e))?;
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| self.lock_error(e))
    }
}

impl StoreLock for AdvisoryFileLock {
    fn acquire(&self) -> OrchestratorResult<LockGuard> {
        let file = self.open()?;
        file.lock_exclusive().map_err(|e| self.lock_error(e))?;
        Ok(LockGuard::new(FileLockGuard { file }))
    }

    fn try_acquire(&self) -> OrchestratorResult<Option<LockGuard>> {
        let file = self.open()?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(LockGuard::new(FileLockGuard { file }))),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(self.lock_error(e)),
        }
    }

    fn describe(&self) -> String {
        format!("advisory lock {}", self.lock_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Spawns workers that each bump a shared counter inside the lock and
    /// records the highest number of concurrent holders observed
    fn max_concurrent_holders(lock: Arc<dyn StoreLock>) -> usize {
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let lock = lock.clone();
                let inside = inside.clone();
                let peak = peak.clone();
                thread::spawn(move || {
                    let _guard = lock.acquire().unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        peak.load(Ordering::SeqCst)
    }

    #[test]
    fn test_lock_mode_parsing() {
        assert_eq!("".parse::<LockMode>().unwrap(), LockMode::Advisory);
        assert_eq!("PROCESS".parse::<LockMode>().unwrap(), LockMode::Process);
        assert!("redis".parse::<LockMode>().is_err());
    }

    #[test]
    fn test_advisory_lock_path_is_sidecar() {
        let lock = AdvisoryFileLock::for_document(Path::new("/data/state.json"));
        assert_eq!(lock.lock_path(), Path::new("/data/state.json.lock"));
    }

    #[test]
    fn test_advisory_lock_excludes_threads() {
        let dir = TempDir::new().unwrap();
        let lock = lock_for(LockMode::Advisory, &dir.path().join("state.json"));
        assert_eq!(max_concurrent_holders(lock), 1);
    }

    #[test]
    fn test_try_acquire_reports_contention() {
        let dir = TempDir::new().unwrap();
        for mode in [LockMode::Advisory, LockMode::Process] {
            let path = dir.path().join(format!("{mode}.json"));
            let first = lock_for(mode, &path);
            let second = lock_for(mode, &path);

            let held = first.try_acquire().unwrap();
            assert!(held.is_some());
            assert!(second.try_acquire().unwrap().is_none());

            drop(held);
            assert!(second.try_acquire().unwrap().is_some());
        }
    }

    #[test]
    fn test_process_lock_is_shared_per_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let first = ProcessLock::for_path(&path);
        let second = ProcessLock::for_path(&path);
        assert!(Arc::ptr_eq(&first.mutex, &second.mutex));
        assert_eq!(max_concurrent_holders(Arc::new(first)), 1);
    }
}
