use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::service::{BackupService, RestoreSummary};
use crate::shared::{AppError, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPayload {
    /// Base64 encoded backup document.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalBackupResponse {
    pub path: String,
}

/// GET /backup
#[instrument(name = "export_backup", skip(state))]
pub async fn export_backup(State(state): State<AppState>) -> Result<Json<BackupPayload>, AppError> {
    let data = BackupService::from_state(&state).export().await?;
    Ok(Json(BackupPayload { data }))
}

/// POST /backup/restore
#[instrument(name = "restore_backup", skip(state, payload))]
pub async fn restore_backup(
    State(state): State<AppState>,
    Json(payload): Json<BackupPayload>,
) -> Result<Json<RestoreSummary>, AppError> {
    let summary = BackupService::from_state(&state)
        .restore(&payload.data)
        .await?;
    Ok(Json(summary))
}

/// POST /backup/local
#[instrument(name = "save_local_backup", skip(state))]
pub async fn save_local_backup(
    State(state): State<AppState>,
) -> Result<Json<LocalBackupResponse>, AppError> {
    let path = BackupService::from_state(&state).save_local().await?;
    Ok(Json(LocalBackupResponse {
        path: path.display().to_string(),
    }))
}

/// POST /backup/local/restore
#[instrument(name = "load_local_backup", skip(state))]
pub async fn load_local_backup(
    State(state): State<AppState>,
) -> Result<Json<RestoreSummary>, AppError> {
    let summary = BackupService::from_state(&state).load_local().await?;
    Ok(Json(summary))
}
