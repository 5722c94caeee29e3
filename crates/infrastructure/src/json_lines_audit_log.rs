use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use remedy_application::AuditRecorder;
use remedy_core::{AppError, AppResult};
use remedy_domain::{AuditFilter, AuditRecord};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only audit log storing one JSON document per line.
#[derive(Debug)]
pub struct JsonLinesAuditLog {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl JsonLinesAuditLog {
    /// Creates an audit log writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensures the log file can be opened for appending.
    pub async fn ensure_writable(&self) -> AppResult<()> {
        let _guard = self.append_lock.lock().await;
        self.open_for_append().await.map(|_| ())
    }

    async fn open_for_append(&self) -> AppResult<tokio::fs::File> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create audit directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to open audit log '{}': {error}",
                    self.path.display()
                ))
            })
    }
}

#[async_trait]
impl AuditRecorder for JsonLinesAuditLog {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
        let mut line = serde_json::to_string(&record).map_err(|error| {
            AppError::Internal(format!("failed to serialize audit record: {error}"))
        })?;
        line.push('\n');

        let _guard = self.append_lock.lock().await;
        let mut file = self.open_for_append().await?;
        file.write_all(line.as_bytes()).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to append audit record to '{}': {error}",
                self.path.display()
            ))
        })?;
        file.flush().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to flush audit log '{}': {error}",
                self.path.display()
            ))
        })
    }

    async fn query(&self, filter: &AuditFilter, limit: usize) -> AppResult<Vec<AuditRecord>> {
        let contents = {
            let _guard = self.append_lock.lock().await;
            match tokio::fs::read_to_string(&self.path).await {
                Ok(contents) => contents,
                Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(error) => {
                    return Err(AppError::Internal(format!(
                        "failed to read audit log '{}': {error}",
                        self.path.display()
                    )));
                }
            }
        };

        let lines: Vec<&str> = contents.lines().collect();
        let mut records = Vec::new();
        for (index, line) in lines.iter().copied().enumerate().rev() {
            if records.len() >= limit {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<AuditRecord>(line) {
                Ok(record) if filter.matches(&record) => records.push(record),
                Ok(_) => {}
                Err(error) => tracing::warn!(
                    line = index + 1,
                    error = %error,
                    "skipping malformed audit line"
                ),
            }
        }

        Ok(records)
    }
}
