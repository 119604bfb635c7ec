//! Word list loaded from a text file

use std::path::{Path, PathBuf};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::ItemSource;

/// One item per line; blank lines and `#` comments are skipped
#[derive(Debug, Clone)]
pub struct FileItemSource {
    path: PathBuf,
}

impl FileItemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse list file contents into items
pub fn parse_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

impl ItemSource for FileItemSource {
    fn load_items(&self) -> OrchestratorResult<Vec<String>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                OrchestratorError::config(format!("word list not found at {}", self.path.display()))
            }
            _ => OrchestratorError::IoError(e),
        })?;
        Ok(parse_items(&raw))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
