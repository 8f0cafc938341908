use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{
    models::{GameId, GameSession, PlayerId, PlayerRecord},
    service::{parse_session_date, DateRange, RecordService},
    types::{DeletedResponse, PlayerNameRequest, SaveSessionRequest, SessionQuery},
};
use crate::shared::{AppError, AppState};

/// GET /players
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerRecord>>, AppError> {
    let players = RecordService::new(state.store.clone()).list_players().await?;
    info!(player_count = players.len(), "Players listed");
    Ok(Json(players))
}

/// POST /players
#[instrument(name = "create_player", skip(state))]
pub async fn create_player(
    State(state): State<AppState>,
    Json(request): Json<PlayerNameRequest>,
) -> Result<(StatusCode, Json<PlayerRecord>), AppError> {
    let player = RecordService::new(state.store.clone())
        .register_player(&request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// DELETE /players
#[instrument(name = "delete_all_players", skip(state))]
pub async fn delete_all_players(
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = RecordService::new(state.store.clone())
        .clear_players()
        .await?;
    Ok(Json(DeletedResponse { deleted }))
}

/// PUT /players/:id
#[instrument(name = "rename_player", skip(state))]
pub async fn rename_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    Json(request): Json<PlayerNameRequest>,
) -> Result<Json<PlayerRecord>, AppError> {
    let player = RecordService::new(state.store.clone())
        .rename_player(player_id, &request.name)
        .await?;
    Ok(Json(player))
}

/// DELETE /players/:id
#[instrument(name = "delete_player", skip(state))]
pub async fn delete_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<StatusCode, AppError> {
    RecordService::new(state.store.clone())
        .remove_player(player_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /games?from=&to=
///
/// Returns sessions newest first, optionally limited to an inclusive date window.
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Vec<GameSession>>, AppError> {
    let range = DateRange {
        from: query.from.as_deref().map(parse_session_date).transpose()?,
        to: query.to.as_deref().map(parse_session_date).transpose()?,
    };
    let sessions = RecordService::new(state.store.clone())
        .list_sessions(range)
        .await?;
    Ok(Json(sessions))
}

/// POST /games
#[instrument(name = "save_game", skip(state, request))]
pub async fn save_game(
    State(state): State<AppState>,
    Json(request): Json<SaveSessionRequest>,
) -> Result<Json<GameSession>, AppError> {
    let session = RecordService::new(state.store.clone())
        .save_session(request)
        .await?;
    Ok(Json(session))
}

/// DELETE /games/:id
#[instrument(name = "delete_game", skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<StatusCode, AppError> {
    RecordService::new(state.store.clone())
        .remove_session(game_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /games
#[instrument(name = "delete_all_games", skip(state))]
pub async fn delete_all_games(
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = RecordService::new(state.store.clone())
        .clear_sessions()
        .await?;
    Ok(Json(DeletedResponse { deleted }))
}
