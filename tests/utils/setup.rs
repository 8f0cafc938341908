use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use carstat::{
    router, AppState, BackupService, InMemoryRecordStore, PlayerRecord, Preferences,
    RecordService, StatsService,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub store: Arc<InMemoryRecordStore>,
    pub records: RecordService,
    pub stats: StatsService,
    pub backup: BackupService,
    pub state: AppState,
    pub players: Vec<PlayerRecord>,
    pub backup_dir: TempDir,
}

impl TestSetup {
    /// Id of a registered player by name.
    pub fn player_id(&self, name: &str) -> i32 {
        self.players
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("player {name} was not registered"))
            .id
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    preferences: Preferences,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            preferences: Preferences::default(),
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["Anna", "Boris", "Clara"])
    }

    pub fn with_local_save(mut self) -> Self {
        self.preferences.local_save_enabled = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryRecordStore::new());
        let backup_dir = TempDir::new().expect("temp dir should be created");

        let records = RecordService::new(store.clone());
        let mut players = Vec::with_capacity(self.players.len());
        for name in &self.players {
            let player = records
                .register_player(name)
                .await
                .expect("player registration should succeed");
            players.push(player);
        }

        let state = AppState::new(
            store.clone(),
            self.preferences,
            backup_dir.path().to_path_buf(),
        );

        TestSetup {
            stats: StatsService::new(store.clone()),
            backup: BackupService::from_state(&state),
            records,
            store,
            state,
            players,
            backup_dir,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
