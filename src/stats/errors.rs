use thiserror::Error;

use crate::records::PlayerId;
use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Store failure, passed through with its original status.
    #[error(transparent)]
    Repository(#[from] AppError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        let message = err.to_string();
        match err {
            StatsError::Repository(inner) => inner,
            StatsError::Validation(msg) => AppError::Validation(msg),
            StatsError::PlayerNotFound(_) => AppError::NotFound(message),
        }
    }
}
