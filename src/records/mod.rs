// Public API - what other modules can use
pub use handlers::{
    create_player, delete_all_games, delete_all_players, delete_game, delete_player, list_games,
    list_players, rename_player, save_game,
};
pub use models::*;
pub use postgres::PostgresRecordStore;
pub use repository::{GameRepository, InMemoryRecordStore, PlayerRepository, RecordStore};
pub use service::{DateRange, RecordService};

mod handlers;
pub mod models;
mod postgres;
pub mod repository;
pub mod service;
pub mod types;
