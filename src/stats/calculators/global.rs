use std::collections::BTreeMap;

use super::{first_best, mean, Directory};
use crate::records::{GameSession, PlayerId, PlayerRecord};
use crate::stats::{GlobalStats, LeaderboardEntry, PlayerHighlight};

pub const TOP_PLAYERS_LIMIT: usize = 3;
/// A runner-up within this many points of the winner counts as a close second.
pub const CLOSE_SECOND_MARGIN: u32 = 5;

pub fn calculate_global_stats(sessions: &[GameSession], players: &[PlayerRecord]) -> GlobalStats {
    let directory = Directory::new(players);

    let scores: Vec<u32> = sessions
        .iter()
        .flat_map(|session| session.entries.iter().map(|e| e.score))
        .collect();

    GlobalStats {
        total_games: sessions.len() as u32,
        avg_score: mean(&scores),
        max_score: scores.iter().copied().max().unwrap_or(0),
        min_score: scores.iter().copied().min().unwrap_or(0),
        top_players: top_players(sessions, &directory),
        longest_win_streak: longest_win_streak(sessions, &directory),
        highest_avg_position: highest_avg_position(sessions, &directory),
        most_frequent_second: most_frequent_second(sessions, &directory),
    }
}

fn top_players(sessions: &[GameSession], directory: &Directory) -> Vec<LeaderboardEntry> {
    let mut wins: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for winner in sessions.iter().filter_map(GameSession::winner) {
        *wins.entry(winner.player_id).or_default() += 1;
    }

    // Stable sort over id-ordered entries leaves equal win counts by id.
    let mut ranked: Vec<(PlayerId, u32)> = wins.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(TOP_PLAYERS_LIMIT)
        .map(|(player_id, wins)| LeaderboardEntry {
            player_id,
            name: directory.name_of(player_id),
            wins,
        })
        .collect()
}

fn longest_win_streak(
    sessions: &[GameSession],
    directory: &Directory,
) -> Option<PlayerHighlight<u32>> {
    let mut ordered: Vec<&GameSession> = sessions.iter().collect();
    ordered.sort_by_key(|session| session.date);

    let mut best: BTreeMap<PlayerId, u32> = BTreeMap::new();
    let mut current: Option<(PlayerId, u32)> = None;

    let mut close_run = |run: Option<(PlayerId, u32)>| {
        if let Some((player_id, length)) = run {
            let longest = best.entry(player_id).or_default();
            *longest = (*longest).max(length);
        }
    };

    for session in ordered {
        let winner = session.winner().map(|e| e.player_id);
        current = match (winner, current) {
            (Some(id), Some((running, length))) if id == running => Some((id, length + 1)),
            (winner, previous) => {
                close_run(previous);
                winner.map(|id| (id, 1))
            }
        };
    }
    close_run(current);

    first_best(best, |a, b| a > b).map(|(player_id, value)| PlayerHighlight {
        player_id,
        name: directory.name_of(player_id),
        value,
    })
}

fn highest_avg_position(
    sessions: &[GameSession],
    directory: &Directory,
) -> Option<PlayerHighlight<f64>> {
    let mut positions: BTreeMap<PlayerId, Vec<u32>> = BTreeMap::new();
    for session in sessions {
        for (index, entry) in session.standings().into_iter().enumerate() {
            positions
                .entry(entry.player_id)
                .or_default()
                .push(index as u32 + 1);
        }
    }

    let averages = positions
        .into_iter()
        .filter(|(player_id, _)| directory.contains(*player_id))
        .map(|(player_id, ranks)| (player_id, mean(&ranks)));

    first_best(averages, |a, b| a < b).map(|(player_id, value)| PlayerHighlight {
        player_id,
        name: directory.name_of(player_id),
        value,
    })
}

fn most_frequent_second(
    sessions: &[GameSession],
    directory: &Directory,
) -> Option<PlayerHighlight<u32>> {
    let mut counts: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for session in sessions {
        let standings = session.standings();
        if let [winner, second, ..] = standings.as_slice() {
            if winner.score - second.score <= CLOSE_SECOND_MARGIN {
                *counts.entry(second.player_id).or_default() += 1;
            }
        }
    }

    first_best(counts, |a, b| a > b).map(|(player_id, value)| PlayerHighlight {
        player_id,
        name: directory.name_of(player_id),
        value,
    })
}
