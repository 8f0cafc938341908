use std::path::PathBuf;

use thiserror::Error;
use tracing::error;

use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid backup JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backup file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid backup record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Store(#[from] AppError),

    #[error("Local saving is disabled")]
    LocalSaveDisabled,

    #[error("No local backup found at {}", .0.display())]
    MissingLocalBackup(PathBuf),
}

impl From<BackupError> for AppError {
    fn from(err: BackupError) -> Self {
        let message = err.to_string();
        match err {
            BackupError::Store(inner) => inner,
            BackupError::Io(_) => {
                error!(error = %message, "Backup file access failed");
                AppError::Internal
            }
            BackupError::LocalSaveDisabled => AppError::Validation(message),
            BackupError::MissingLocalBackup(_) => AppError::NotFound(message),
            _ => AppError::Backup(message),
        }
    }
}
