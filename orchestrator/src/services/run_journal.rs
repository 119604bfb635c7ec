//! Append-only JSON-lines log of finished runs

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use shared::{process_debug, RunSummary, ProcessId};
use crate::error::OrchestratorResult;

pub const JOURNAL_FILE: &str = "runs.jsonl";

#[derive(Debug, Clone)]
pub struct RunJournal {
    path: PathBuf,
}

impl RunJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal stored as `runs.jsonl` inside `logs_dir`
    pub fn in_dir(logs_dir: &Path) -> Self {
        Self::new(logs_dir.join(JOURNAL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, summary: &RunSummary) -> OrchestratorResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut line = serde_json::to_string(summary)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        process_debug!(ProcessId::current(), "Run {} journaled to {}", summary.run_id, self.path.display());
        Ok(())
    }

    /// Summaries in file order; unparseable lines are skipped
    pub async fn read_all(&self) -> OrchestratorResult<Vec<RunSummary>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}
