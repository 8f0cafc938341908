use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{BackupDocument, BackupError};
use crate::records::RecordStore;
use crate::shared::AppState;

pub const BACKUP_FILE_NAME: &str = "CarcassonneStatistics.backup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub players: usize,
    pub games: usize,
}

pub struct BackupService {
    store: Arc<dyn RecordStore>,
    backup_dir: PathBuf,
    local_save_enabled: bool,
}

impl BackupService {
    pub fn new(store: Arc<dyn RecordStore>, backup_dir: PathBuf, local_save_enabled: bool) -> Self {
        Self {
            store,
            backup_dir,
            local_save_enabled,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.store.clone(),
            state.backup_dir.clone(),
            state.preferences.local_save_enabled,
        )
    }

    pub fn local_path(&self) -> PathBuf {
        self.backup_dir.join(BACKUP_FILE_NAME)
    }

    /// Every player and session, encoded for transport.
    #[instrument(skip(self))]
    pub async fn export(&self) -> Result<String, BackupError> {
        let snapshot = self.store.snapshot().await?;
        let encoded =
            BackupDocument::from_records(&snapshot.players, &snapshot.sessions).encode()?;

        info!(
            players = snapshot.players.len(),
            games = snapshot.sessions.len(),
            "Backup exported"
        );
        Ok(encoded)
    }

    /// Replaces all records with the decoded backup. Nothing is written when
    /// the payload is rejected.
    #[instrument(skip(self, encoded))]
    pub async fn restore(&self, encoded: &str) -> Result<RestoreSummary, BackupError> {
        let (players, sessions) = BackupDocument::decode(encoded)?.into_records()?;
        let summary = RestoreSummary {
            players: players.len(),
            games: sessions.len(),
        };

        self.store.replace_all(players, sessions).await?;
        info!(players = summary.players, games = summary.games, "Backup restored");
        Ok(summary)
    }

    #[instrument(skip(self))]
    pub async fn save_local(&self) -> Result<PathBuf, BackupError> {
        if !self.local_save_enabled {
            warn!("Local backup requested while local saving is disabled");
            return Err(BackupError::LocalSaveDisabled);
        }

        let encoded = self.export().await?;
        tokio::fs::create_dir_all(&self.backup_dir).await?;
        let path = self.local_path();
        tokio::fs::write(&path, encoded).await?;

        info!(path = %path.display(), "Local backup written");
        Ok(path)
    }

    #[instrument(skip(self))]
    pub async fn load_local(&self) -> Result<RestoreSummary, BackupError> {
        let path = self.local_path();
        let encoded = read_backup_file(&path).await?;
        self.restore(&encoded).await
    }
}

async fn read_backup_file(path: &Path) -> Result<String, BackupError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(BackupError::MissingLocalBackup(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}
