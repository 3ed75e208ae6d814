//! Append-only Markdown log of prompt/reply exchanges.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::prompt::PromptPair;

/// An append-only audit log file.
///
/// The file is opened, appended to and closed on every call; no handle is
/// held in between. Concurrent writers are not coordinated.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// A log writing to `path`. Nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this log appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one exchange, stamped with the current local time.
    pub async fn append(&self, prompt: &PromptPair, reply: &str) -> std::io::Result<()> {
        self.append_at(Local::now(), prompt, reply).await
    }

    /// Append one exchange with an explicit timestamp.
    pub async fn append_at(
        &self,
        at: DateTime<Local>,
        prompt: &PromptPair,
        reply: &str,
    ) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let record = format_record(at, prompt, reply);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %self.path.display(), bytes = record.len(), "appended audit record");
        Ok(())
    }
}

/// Render one Markdown record.
pub(crate) fn format_record(at: DateTime<Local>, prompt: &PromptPair, reply: &str) -> String {
    format!(
        "# {}\n## System Prompt\n{}\n## User Prompt\n{}\n## Reply\n{}\n",
        at.format("%Y-%m-%d %H:%M:%S%.6f"),
        hard_breaks(prompt.system()),
        hard_breaks(prompt.user()),
        reply,
    )
}

/// Join lines with a Markdown hard break so each prompt line renders on its own.
fn hard_breaks(text: &str) -> String {
    text.split('\n').collect::<Vec<_>>().join("  \n")
}
