use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::common::{ChatError, DisplayMessage};

/// Append-only trail of every message received from the overlay.
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes and flushes one line; any failure is [`ChatError::FatalIo`].
    pub async fn record(&mut self, message: &DisplayMessage) -> Result<String, ChatError> {
        let line = format_line(message);
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        Ok(line)
    }
}

pub fn format_line(message: &DisplayMessage) -> String {
    format!(
        "Received message at {} from {} ({}): {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"),
        message.sender,
        message.user_type.as_str(),
        message.content.trim_end_matches(['\r', '\n'])
    )
}
