use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Preferences;
use crate::shared::AppState;
use crate::{backup, records, stats};

/// GET /settings
pub async fn settings(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/players",
            get(records::list_players)
                .post(records::create_player)
                .delete(records::delete_all_players),
        )
        .route(
            "/players/:id",
            put(records::rename_player).delete(records::delete_player),
        )
        .route("/players/:id/profile", get(stats::player_profile))
        .route(
            "/games",
            get(records::list_games)
                .post(records::save_game)
                .delete(records::delete_all_games),
        )
        .route("/games/:id", axum::routing::delete(records::delete_game))
        .route("/stats/global", get(stats::global_stats))
        .route("/stats/compare", get(stats::compare_players))
        .route("/backup", get(backup::export_backup))
        .route("/backup/restore", post(backup::restore_backup))
        .route("/backup/local", post(backup::save_local_backup))
        .route("/backup/local/restore", post(backup::load_local_backup))
        .route("/settings", get(settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_settings_reflect_preferences() {
        let state = AppStateBuilder::new()
            .with_preferences(Preferences {
                theme: Theme::Dark,
                background_enabled: true,
                local_save_enabled: false,
            })
            .build();

        let response = router(state)
            .oneshot(Request::get("/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "theme": "dark",
                "background_enabled": true,
                "local_save_enabled": false
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = router(AppStateBuilder::new().build())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
