pub mod calculators;
pub mod comparison;
pub mod service;

mod errors;
mod handlers;
pub mod models;

pub use comparison::{project, Comparison, ComparisonMode, Tone};
pub use errors::StatsError;
pub use handlers::{compare_players, global_stats, player_profile, CompareQuery};
pub use models::*;
pub use service::{StatsService, MAX_COMPARED_PLAYERS};
