use std::sync::Arc;

use tracing::{debug, instrument};

use super::{
    calculators::{calculate_global_stats, calculate_player_profile, calculate_player_stats},
    comparison::{project, Comparison, ComparisonMode},
    GlobalStats, PlayerProfile, PlayerStats, StatsError,
};
use crate::records::{PlayerId, PlayerRecord, RecordStore};

/// Most players that can be put side by side at once.
pub const MAX_COMPARED_PLAYERS: usize = 3;

/// Reads one snapshot of the records per call and runs the calculators on it.
pub struct StatsService {
    store: Arc<dyn RecordStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn global_stats(&self) -> Result<GlobalStats, StatsError> {
        let snapshot = self.store.snapshot().await?;
        let stats = calculate_global_stats(&snapshot.sessions, &snapshot.players);

        debug!(
            total_games = stats.total_games,
            leaders = stats.top_players.len(),
            "Global stats computed"
        );
        Ok(stats)
    }

    /// Stats for `player_ids` in the given order. Every id must be known.
    #[instrument(skip(self))]
    pub async fn player_stats(&self, player_ids: &[PlayerId]) -> Result<Vec<PlayerStats>, StatsError> {
        let snapshot = self.store.snapshot().await?;
        let selected = select_players(&snapshot.players, player_ids)?;
        Ok(calculate_player_stats(&selected, &snapshot.sessions))
    }

    #[instrument(skip(self))]
    pub async fn compare(
        &self,
        player_ids: &[PlayerId],
        mode: ComparisonMode,
    ) -> Result<Comparison, StatsError> {
        if player_ids.is_empty() {
            return Err(StatsError::Validation(
                "Select at least one player to compare".to_string(),
            ));
        }
        if player_ids.len() > MAX_COMPARED_PLAYERS {
            return Err(StatsError::Validation(format!(
                "At most {} players can be compared",
                MAX_COMPARED_PLAYERS
            )));
        }

        let stats = self.player_stats(player_ids).await?;
        debug!(players = stats.len(), mode = %mode, "Comparison projected");
        Ok(project(mode, &stats))
    }

    #[instrument(skip(self))]
    pub async fn player_profile(&self, player_id: PlayerId) -> Result<PlayerProfile, StatsError> {
        let snapshot = self.store.snapshot().await?;
        let player = snapshot
            .players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(StatsError::PlayerNotFound(player_id))?;

        Ok(calculate_player_profile(player, &snapshot.sessions))
    }
}

fn select_players(
    players: &[PlayerRecord],
    player_ids: &[PlayerId],
) -> Result<Vec<PlayerRecord>, StatsError> {
    player_ids
        .iter()
        .map(|&id| {
            players
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(StatsError::PlayerNotFound(id))
        })
        .collect()
}
