//! Append-only plain-text result log.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::error;

#[derive(Debug, Error)]
#[error("failed to append to result log {path}: {source}")]
pub struct JournalError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// Durable result log; appends are serialized so lines never interleave.
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Append `message` and a newline, creating the file if needed.
    pub async fn append(&self, message: &str) -> Result<(), JournalError> {
        let _guard = self.lock.lock().await;

        let to_error = |source| JournalError { path: self.path.clone(), source };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(to_error)?;

        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message);
        line.push('\n');
        file.write_all(line.as_bytes()).await.map_err(to_error)?;
        file.flush().await.map_err(to_error)
    }

    /// Best-effort append: a failed write is reported on the console and dropped.
    pub async fn record(&self, message: &str) {
        if let Err(e) = self.append(message).await {
            error!("Error logging result: {}", e);
        }
    }
}
