// Library crate for the Carcassonne statistics service
// This file exposes the public API for the binary and integration tests

pub mod app;
pub mod backup;
pub mod config;
pub mod records;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use app::router;
pub use backup::{BackupDocument, BackupError, BackupService};
pub use config::{AppConfig, ConfigError, Preferences, Theme};
pub use records::{
    GameSession, InMemoryRecordStore, PlayerRecord, PostgresRecordStore, RecordService,
    RecordStore, ScoreEntry,
};
pub use shared::{AppError, AppState};
pub use stats::{Comparison, ComparisonMode, GlobalStats, PlayerStats, StatsService};
