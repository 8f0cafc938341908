use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{
    GameId, GameSession, PlayerDraft, PlayerId, PlayerRecord, RecordSnapshot, SessionDraft,
};
use crate::shared::AppError;

/// Game Record Store: completed sessions with their score entries.
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<GameSession>, AppError>;
    async fn upsert_session(&self, draft: SessionDraft) -> Result<GameId, AppError>;
    async fn delete_session(&self, game_id: GameId) -> Result<(), AppError>;
    async fn delete_all_sessions(&self) -> Result<u64, AppError>;
}

/// Player Directory: stable ids to display names.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn list_players(&self) -> Result<Vec<PlayerRecord>, AppError>;
    async fn upsert_player(&self, draft: PlayerDraft) -> Result<PlayerId, AppError>;

    /// Removes the player and every score entry that references them.
    async fn delete_player(&self, player_id: PlayerId) -> Result<(), AppError>;
    async fn delete_all_players(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RecordStore: GameRepository + PlayerRepository {
    /// Wipes both tables and loads the given records in one step.
    async fn replace_all(
        &self,
        players: Vec<PlayerRecord>,
        sessions: Vec<GameSession>,
    ) -> Result<(), AppError>;

    async fn snapshot(&self) -> Result<RecordSnapshot, AppError> {
        let players = self.list_players().await?;
        let sessions = self.list_sessions().await?;
        Ok(RecordSnapshot { players, sessions })
    }
}

/// Next identity for a table: one past the current maximum.
pub(crate) fn next_id<V>(table: &BTreeMap<i32, V>) -> i32 {
    table.keys().next_back().map_or(1, |max| max + 1)
}

/// Player names are unique across the directory.
pub(crate) fn duplicate_name(name: &str) -> AppError {
    AppError::Validation(format!("player {:?} already exists", name))
}

/// Foreign-key and uniqueness checks a relational store would enforce.
pub(crate) fn check_session_integrity(
    session: &GameSession,
    known_players: &HashSet<PlayerId>,
) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for entry in &session.entries {
        if !known_players.contains(&entry.player_id) {
            return Err(AppError::DatabaseError(format!(
                "game {} references unknown player {}",
                session.id, entry.player_id
            )));
        }
        if !seen.insert(entry.player_id) {
            return Err(AppError::DatabaseError(format!(
                "game {} lists player {} more than once",
                session.id, entry.player_id
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct StoreState {
    players: BTreeMap<PlayerId, PlayerRecord>,
    sessions: BTreeMap<GameId, GameSession>,
}

impl StoreState {
    fn player_ids(&self) -> HashSet<PlayerId> {
        self.players.keys().copied().collect()
    }

    fn name_taken(&self, name: &str, except: Option<PlayerId>) -> bool {
        self.players
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }
}

/// In-memory implementation of the record store for development and testing
///
/// Data is lost when the process exits. Both tables live behind one lock so
/// `snapshot` never observes a half-applied write.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    state: RwLock<StoreState>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-populated records
    pub fn with_records(
        players: Vec<PlayerRecord>,
        sessions: Vec<GameSession>,
    ) -> Result<Self, AppError> {
        let state = build_state(players, sessions)?;
        Ok(Self {
            state: RwLock::new(state),
        })
    }
}

fn build_state(
    players: Vec<PlayerRecord>,
    sessions: Vec<GameSession>,
) -> Result<StoreState, AppError> {
    let mut state = StoreState::default();
    for player in players {
        if state.name_taken(&player.name, None) {
            return Err(duplicate_name(&player.name));
        }
        if state.players.insert(player.id, player).is_some() {
            return Err(AppError::DatabaseError("duplicate player id".to_string()));
        }
    }

    let known = state.player_ids();
    for session in sessions {
        check_session_integrity(&session, &known)?;
        if state.sessions.insert(session.id, session).is_some() {
            return Err(AppError::DatabaseError("duplicate game id".to_string()));
        }
    }
    Ok(state)
}

#[async_trait]
impl GameRepository for InMemoryRecordStore {
    #[instrument(skip(self))]
    async fn list_sessions(&self) -> Result<Vec<GameSession>, AppError> {
        let state = self.state.read().await;
        let sessions: Vec<GameSession> = state.sessions.values().cloned().collect();
        debug!(session_count = sessions.len(), "Listed sessions from memory");
        Ok(sessions)
    }

    #[instrument(skip(self, draft))]
    async fn upsert_session(&self, draft: SessionDraft) -> Result<GameId, AppError> {
        let mut state = self.state.write().await;
        let id = draft.id.unwrap_or_else(|| next_id(&state.sessions));
        let session = GameSession {
            id,
            date: draft.date,
            entries: draft.entries,
        };

        check_session_integrity(&session, &state.player_ids())?;
        state.sessions.insert(id, session);

        debug!(game_id = id, "Session stored in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, game_id: GameId) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.sessions.remove(&game_id).is_none() {
            warn!(game_id, "Session not found for deletion in memory");
            return Err(AppError::NotFound(format!("Game {} not found", game_id)));
        }
        debug!(game_id, "Session deleted from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_sessions(&self) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let removed = state.sessions.len() as u64;
        state.sessions.clear();
        debug!(removed, "All sessions deleted from memory");
        Ok(removed)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryRecordStore {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerRecord>, AppError> {
        let state = self.state.read().await;
        Ok(state.players.values().cloned().collect())
    }

    #[instrument(skip(self, draft))]
    async fn upsert_player(&self, draft: PlayerDraft) -> Result<PlayerId, AppError> {
        let mut state = self.state.write().await;
        if state.name_taken(&draft.name, draft.id) {
            warn!(name = %draft.name, "Player name already taken");
            return Err(duplicate_name(&draft.name));
        }
        let id = draft.id.unwrap_or_else(|| next_id(&state.players));
        state.players.insert(
            id,
            PlayerRecord {
                id,
                name: draft.name,
                display_frame: draft.display_frame,
            },
        );
        debug!(player_id = id, "Player stored in memory");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, player_id: PlayerId) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.players.remove(&player_id).is_none() {
            warn!(player_id, "Player not found for deletion in memory");
            return Err(AppError::NotFound(format!(
                "Player {} not found",
                player_id
            )));
        }

        let mut cascaded = 0usize;
        for session in state.sessions.values_mut() {
            let before = session.entries.len();
            session.entries.retain(|entry| entry.player_id != player_id);
            cascaded += before - session.entries.len();
        }

        debug!(player_id, cascaded, "Player deleted from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_players(&self) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let removed = state.players.len() as u64;
        state.players.clear();
        for session in state.sessions.values_mut() {
            session.entries.clear();
        }
        debug!(removed, "All players deleted from memory");
        Ok(removed)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    #[instrument(skip(self, players, sessions))]
    async fn replace_all(
        &self,
        players: Vec<PlayerRecord>,
        sessions: Vec<GameSession>,
    ) -> Result<(), AppError> {
        let replacement = build_state(players, sessions)?;
        let mut state = self.state.write().await;
        *state = replacement;
        debug!(
            player_count = state.players.len(),
            session_count = state.sessions.len(),
            "Store contents replaced"
        );
        Ok(())
    }

    async fn snapshot(&self) -> Result<RecordSnapshot, AppError> {
        let state = self.state.read().await;
        Ok(RecordSnapshot {
            players: state.players.values().cloned().collect(),
            sessions: state.sessions.values().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::models::ScoreEntry;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn player(name: &str) -> PlayerDraft {
        PlayerDraft {
            id: None,
            name: name.to_string(),
            display_frame: 1,
        }
    }

    fn draft(day: u32, scores: &[(PlayerId, u32)]) -> SessionDraft {
        SessionDraft {
            id: None,
            date: date(day),
            entries: scores
                .iter()
                .map(|&(player_id, score)| ScoreEntry::new(player_id, score))
                .collect(),
        }
    }

    async fn store_with_two_players() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        store.upsert_player(player("Anna")).await.unwrap();
        store.upsert_player(player("Boris")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn allocates_ids_past_current_maximum() {
        let store = InMemoryRecordStore::new();
        let first = store.upsert_player(player("Anna")).await.unwrap();
        let explicit = store
            .upsert_player(PlayerDraft {
                id: Some(10),
                ..player("Boris")
            })
            .await
            .unwrap();
        let next = store.upsert_player(player("Clara")).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(explicit, 10);
        assert_eq!(next, 11);
    }

    #[tokio::test]
    async fn upsert_with_existing_id_replaces_session() {
        let store = store_with_two_players().await;
        let id = store.upsert_session(draft(1, &[(1, 10), (2, 20)])).await.unwrap();

        let mut replacement = draft(2, &[(1, 50)]);
        replacement.id = Some(id);
        store.upsert_session(replacement).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].date, date(2));
        assert_eq!(sessions[0].entries, vec![ScoreEntry::new(1, 50)]);
    }

    #[tokio::test]
    async fn rejects_entries_for_unknown_players() {
        let store = store_with_two_players().await;
        let result = store.upsert_session(draft(1, &[(1, 10), (9, 20)])).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_duplicate_player_in_session() {
        let store = store_with_two_players().await;
        let result = store.upsert_session(draft(1, &[(1, 10), (1, 20)])).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn deleting_player_cascades_to_entries() {
        let store = store_with_two_players().await;
        store.upsert_session(draft(1, &[(1, 10), (2, 20)])).await.unwrap();
        store.upsert_session(draft(2, &[(2, 5)])).await.unwrap();

        store.delete_player(2).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].entries, vec![ScoreEntry::new(1, 10)]);
        assert!(sessions[1].entries.is_empty());
        assert_eq!(store.list_players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_missing_records_is_not_found() {
        let store = InMemoryRecordStore::new();
        assert!(matches!(
            store.delete_player(4).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_session(4).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn player_names_stay_unique_under_concurrent_registration() {
        let store = std::sync::Arc::new(InMemoryRecordStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert_player(player("Anna")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, AppError::Validation(_))),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.list_players().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renaming_to_own_name_is_allowed() {
        let store = store_with_two_players().await;
        let same = store
            .upsert_player(PlayerDraft {
                id: Some(1),
                ..player("Anna")
            })
            .await;
        assert_eq!(same.unwrap(), 1);

        let taken = store
            .upsert_player(PlayerDraft {
                id: Some(1),
                ..player("Boris")
            })
            .await;
        assert!(matches!(taken, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_all_players_empties_every_session() {
        let store = store_with_two_players().await;
        store.upsert_session(draft(1, &[(1, 10), (2, 4)])).await.unwrap();

        assert_eq!(store.delete_all_players().await.unwrap(), 2);
        let snapshot = store.snapshot().await.unwrap();
        assert!(snapshot.players.is_empty());
        assert!(snapshot.sessions[0].entries.is_empty());
    }

    #[tokio::test]
    async fn delete_all_sessions_reports_count() {
        let store = store_with_two_players().await;
        store.upsert_session(draft(1, &[(1, 10)])).await.unwrap();
        store.upsert_session(draft(2, &[(2, 10)])).await.unwrap();

        assert_eq!(store.delete_all_sessions().await.unwrap(), 2);
        assert!(store.list_sessions().await.unwrap().is_empty());
        assert_eq!(store.list_players().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn replace_all_is_all_or_nothing() {
        let store = store_with_two_players().await;
        store.upsert_session(draft(1, &[(1, 10)])).await.unwrap();

        let bad = store
            .replace_all(
                vec![PlayerRecord {
                    id: 3,
                    name: "Clara".into(),
                    display_frame: 2,
                }],
                vec![GameSession {
                    id: 1,
                    date: date(4),
                    entries: vec![ScoreEntry::new(8, 1)],
                }],
            )
            .await;
        assert!(bad.is_err());

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.sessions.len(), 1);

        store
            .replace_all(
                vec![PlayerRecord {
                    id: 3,
                    name: "Clara".into(),
                    display_frame: 2,
                }],
                vec![],
            )
            .await
            .unwrap();
        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.players[0].name, "Clara");
        assert!(snapshot.sessions.is_empty());
    }
}
