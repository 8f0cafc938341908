use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use tracing::{info, instrument};

use super::{
    comparison::{Comparison, ComparisonMode},
    service::StatsService,
    GlobalStats, PlayerProfile,
};
use crate::records::PlayerId;
use crate::shared::{AppError, AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct CompareQuery {
    /// Comma separated player ids, e.g. `1,2,3`.
    pub players: String,
    /// One of the `ComparisonMode` names, e.g. `score_trend`. Defaults to `table`.
    #[serde(default)]
    pub mode: Option<String>,
}

fn parse_mode(raw: Option<&str>) -> Result<ComparisonMode, AppError> {
    match raw.map(str::trim).filter(|mode| !mode.is_empty()) {
        None => Ok(ComparisonMode::default()),
        Some(mode) => ComparisonMode::from_str(mode)
            .map_err(|_| AppError::Validation(format!("Unknown comparison mode: {}", mode))),
    }
}

fn parse_player_ids(raw: &str) -> Result<Vec<PlayerId>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<PlayerId>()
                .map_err(|_| AppError::Validation(format!("Invalid player id: {}", part)))
        })
        .collect()
}

/// GET /stats/global
#[instrument(name = "global_stats", skip(state))]
pub async fn global_stats(State(state): State<AppState>) -> Result<Json<GlobalStats>, AppError> {
    let stats = StatsService::new(state.store.clone()).global_stats().await?;
    Ok(Json(stats))
}

/// GET /stats/compare?players=1,2&mode=skill
#[instrument(name = "compare_players", skip(state))]
pub async fn compare_players(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Comparison>, AppError> {
    let player_ids = parse_player_ids(&query.players)?;
    let mode = parse_mode(query.mode.as_deref())?;

    let comparison = StatsService::new(state.store.clone())
        .compare(&player_ids, mode)
        .await?;
    info!(players = ?player_ids, mode = %mode, "Players compared");
    Ok(Json(comparison))
}

/// GET /players/:id/profile
#[instrument(name = "player_profile", skip(state))]
pub async fn player_profile(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<PlayerProfile>, AppError> {
    let profile = StatsService::new(state.store.clone())
        .player_profile(player_id)
        .await?;
    Ok(Json(profile))
}
