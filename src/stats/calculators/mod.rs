//! Pure statistics over a snapshot of players and sessions.
//!
//! Nothing here performs I/O or fails: empty input yields zeroed results and
//! every division by a possibly-empty count is guarded.

pub mod global;
pub mod player_metrics;
pub mod profile;

pub use global::calculate_global_stats;
pub use player_metrics::{calculate_player_stats, player_stats};
pub use profile::calculate_player_profile;

use std::collections::HashMap;

use crate::records::{PlayerId, PlayerRecord};

/// Arithmetic mean, 0 for an empty slice.
pub(crate) fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: u64 = values.iter().map(|&v| u64::from(v)).sum();
    total as f64 / values.len() as f64
}

/// Population standard deviation around `mean`, 0 with fewer than two values.
pub(crate) fn population_std_dev(values: &[u32], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|&v| {
            let deviation = f64::from(v) - mean;
            deviation * deviation
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Name lookup keyed by player id.
pub(crate) struct Directory<'a> {
    names: HashMap<PlayerId, &'a str>,
}

impl<'a> Directory<'a> {
    pub(crate) fn new(players: &'a [PlayerRecord]) -> Self {
        Self {
            names: players.iter().map(|p| (p.id, p.name.as_str())).collect(),
        }
    }

    pub(crate) fn contains(&self, player_id: PlayerId) -> bool {
        self.names.contains_key(&player_id)
    }

    pub(crate) fn name_of(&self, player_id: PlayerId) -> String {
        match self.names.get(&player_id) {
            Some(name) => (*name).to_string(),
            None => format!("Unknown (ID: {})", player_id),
        }
    }
}

/// Picks the entry whose value is best according to `better`, scanning in
/// iteration order so the earliest candidate wins ties.
pub(crate) fn first_best<K, V, I, F>(candidates: I, better: F) -> Option<(K, V)>
where
    I: IntoIterator<Item = (K, V)>,
    F: Fn(&V, &V) -> bool,
{
    candidates.into_iter().fold(None, |best, (key, value)| match best {
        Some((best_key, best_value)) if !better(&value, &best_value) => {
            Some((best_key, best_value))
        }
        _ => Some((key, value)),
    })
}
