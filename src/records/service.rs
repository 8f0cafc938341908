use chrono::NaiveDate;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{
        GameId, GameSession, PlayerDraft, PlayerId, PlayerRecord, ScoreEntry, SessionDraft,
        DISPLAY_FRAME_COUNT,
    },
    repository::RecordStore,
    types::SaveSessionRequest,
};
use crate::shared::AppError;

const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parses a session date in storage (`2024-01-31`) or display (`31.01.2024`) form.
pub fn parse_session_date(input: &str) -> Result<NaiveDate, AppError> {
    let trimmed = input.trim();
    let format = if trimmed.contains('.') {
        DISPLAY_DATE_FORMAT
    } else {
        STORAGE_DATE_FORMAT
    };
    NaiveDate::parse_from_str(trimmed, format)
        .map_err(|_| AppError::Validation(format!("invalid date {:?}", input)))
}

/// Inclusive date window; an open bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Service for player and session bookkeeping
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_players(&self) -> Result<Vec<PlayerRecord>, AppError> {
        self.store.list_players().await
    }

    #[instrument(skip(self))]
    pub async fn register_player(&self, name: &str) -> Result<PlayerRecord, AppError> {
        let players = self.store.list_players().await?;
        let name = validate_player_name(name, &players, None)?;
        let display_frame = rand::rng().random_range(1..=DISPLAY_FRAME_COUNT);

        let id = self
            .store
            .upsert_player(PlayerDraft {
                id: None,
                name: name.clone(),
                display_frame,
            })
            .await?;

        info!(player_id = id, name = %name, display_frame, "Player registered");
        Ok(PlayerRecord {
            id,
            name,
            display_frame,
        })
    }

    #[instrument(skip(self))]
    pub async fn rename_player(
        &self,
        player_id: PlayerId,
        name: &str,
    ) -> Result<PlayerRecord, AppError> {
        let players = self.store.list_players().await?;
        let existing = players
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Player {} not found", player_id)))?;
        let name = validate_player_name(name, &players, Some(player_id))?;

        self.store
            .upsert_player(PlayerDraft {
                id: Some(player_id),
                name: name.clone(),
                display_frame: existing.display_frame,
            })
            .await?;

        info!(player_id, name = %name, "Player renamed");
        Ok(PlayerRecord { name, ..existing })
    }

    #[instrument(skip(self))]
    pub async fn remove_player(&self, player_id: PlayerId) -> Result<(), AppError> {
        self.store.delete_player(player_id).await?;
        info!(player_id, "Player removed");
        Ok(())
    }

    /// Removes every player. Sessions stay, emptied of their entries.
    #[instrument(skip(self))]
    pub async fn clear_players(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_all_players().await?;
        info!(removed, "All players removed");
        Ok(removed)
    }

    /// Sessions inside `range`, newest first.
    #[instrument(skip(self))]
    pub async fn list_sessions(&self, range: DateRange) -> Result<Vec<GameSession>, AppError> {
        let mut sessions: Vec<GameSession> = self
            .store
            .list_sessions()
            .await?
            .into_iter()
            .filter(|session| range.contains(session.date))
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        debug!(session_count = sessions.len(), "Sessions listed");
        Ok(sessions)
    }

    #[instrument(skip(self, request))]
    pub async fn save_session(&self, request: SaveSessionRequest) -> Result<GameSession, AppError> {
        let date = parse_session_date(&request.date)?;
        let players = self.store.list_players().await?;
        let entries = validate_entries(&request, &players)?;

        if let Some(id) = request.id {
            let sessions = self.store.list_sessions().await?;
            if !sessions.iter().any(|s| s.id == id) {
                warn!(game_id = id, "Cannot update missing session");
                return Err(AppError::NotFound(format!("Game {} not found", id)));
            }
        }

        let id = self
            .store
            .upsert_session(SessionDraft {
                id: request.id,
                date,
                entries: entries.clone(),
            })
            .await?;

        info!(game_id = id, entry_count = entries.len(), %date, "Session saved");
        Ok(GameSession { id, date, entries })
    }

    #[instrument(skip(self))]
    pub async fn remove_session(&self, game_id: GameId) -> Result<(), AppError> {
        self.store.delete_session(game_id).await?;
        info!(game_id, "Session removed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clear_sessions(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_all_sessions().await?;
        info!(removed, "All sessions removed");
        Ok(removed)
    }
}

fn validate_player_name(
    name: &str,
    players: &[PlayerRecord],
    renaming: Option<PlayerId>,
) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "player name must not be empty".to_string(),
        ));
    }
    if players
        .iter()
        .any(|p| p.name == name && Some(p.id) != renaming)
    {
        return Err(AppError::Validation(format!(
            "player {:?} already exists",
            name
        )));
    }
    Ok(name.to_string())
}

fn validate_entries(
    request: &SaveSessionRequest,
    players: &[PlayerRecord],
) -> Result<Vec<ScoreEntry>, AppError> {
    if request.entries.is_empty() {
        return Err(AppError::Validation("no players selected".to_string()));
    }

    let known: HashSet<PlayerId> = players.iter().map(|p| p.id).collect();
    let mut seen_players = HashSet::new();
    let mut seen_colors = HashSet::new();
    let mut entries = Vec::with_capacity(request.entries.len());

    for entry in &request.entries {
        if !known.contains(&entry.player_id) {
            return Err(AppError::Validation(format!(
                "unknown player {}",
                entry.player_id
            )));
        }
        if !seen_players.insert(entry.player_id) {
            return Err(AppError::Validation(
                "duplicate players are not allowed".to_string(),
            ));
        }
        let color = entry.color.ok_or_else(|| {
            AppError::Validation("all players must have a color selected".to_string())
        })?;
        if !seen_colors.insert(color) {
            return Err(AppError::Validation(format!(
                "color {} is used more than once",
                color
            )));
        }

        entries.push(ScoreEntry {
            player_id: entry.player_id,
            score: entry.score,
            color: Some(color),
        });
    }

    Ok(entries)
}
