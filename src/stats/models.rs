use serde::{Deserialize, Serialize};

use crate::records::PlayerId;

/// Derived per-player statistics. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub avg_score: f64,
    pub total_games: u32,
    /// Same as `total_games`; charted against average score.
    pub experience: u32,
    /// Win percentage, 0..=100.
    pub skill: f64,
    /// Population standard deviation of the player's scores.
    pub stability: f64,
    /// Scores ordered by session date, oldest first.
    pub score_trend: Vec<u32>,
    pub last_place_count: u32,
    pub max_gap: u32,
    pub min_gap: u32,
    /// Winning score minus this player's score, one per session played, in
    /// session order (not date order).
    pub gaps_from_winner: Vec<u32>,
}

impl PlayerStats {
    pub fn mean_gap_from_winner(&self) -> f64 {
        super::calculators::mean(&self.gaps_from_winner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: u32,
}

/// A single standout player for one summary metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHighlight<T> {
    pub player_id: PlayerId,
    pub name: String,
    pub value: T,
}

/// Summary over the whole history. Absent highlights render as "N/A".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_games: u32,
    pub avg_score: f64,
    pub max_score: u32,
    pub min_score: u32,
    pub top_players: Vec<LeaderboardEntry>,
    pub longest_win_streak: Option<PlayerHighlight<u32>>,
    pub highest_avg_position: Option<PlayerHighlight<f64>>,
    pub most_frequent_second: Option<PlayerHighlight<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub name: String,
    pub games_played: u32,
    pub max_score: u32,
    pub total_score: u64,
    /// Mean score rounded to the nearest whole point.
    pub avg_score: u32,
    /// `placements[0]` counts first places, `placements[1]` second places and
    /// so on. Always at least three long.
    pub placements: Vec<u32>,
}
