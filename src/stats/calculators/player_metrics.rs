use chrono::NaiveDate;

use super::{mean, population_std_dev};
use crate::records::{GameSession, PlayerRecord};
use crate::stats::PlayerStats;

/// One `PlayerStats` per requested player, in request order. Listing a player
/// twice yields two identical results.
pub fn calculate_player_stats(players: &[PlayerRecord], sessions: &[GameSession]) -> Vec<PlayerStats> {
    players
        .iter()
        .map(|player| player_stats(player, sessions))
        .collect()
}

pub fn player_stats(player: &PlayerRecord, sessions: &[GameSession]) -> PlayerStats {
    let played: Vec<(&GameSession, u32)> = sessions
        .iter()
        .filter_map(|session| {
            session
                .entry_for(player.id)
                .map(|entry| (session, entry.score))
        })
        .collect();

    let total_games = played.len() as u32;
    let wins = played
        .iter()
        .filter(|(session, _)| session.winner().map(|e| e.player_id) == Some(player.id))
        .count() as u32;
    let last_place_count = played
        .iter()
        .filter(|(session, _)| session.last_place().map(|e| e.player_id) == Some(player.id))
        .count() as u32;

    let scores: Vec<u32> = played.iter().map(|&(_, score)| score).collect();
    let avg_score = mean(&scores);
    let stability = population_std_dev(&scores, avg_score);
    let skill = if total_games > 0 {
        f64::from(wins) / f64::from(total_games) * 100.0
    } else {
        0.0
    };

    let mut dated: Vec<(NaiveDate, u32)> = played
        .iter()
        .map(|&(session, score)| (session.date, score))
        .collect();
    dated.sort_by_key(|&(date, _)| date);
    let score_trend = dated.into_iter().map(|(_, score)| score).collect();

    let gaps: Vec<u32> = played
        .iter()
        .filter_map(|&(session, score)| nearest_rival_gap(session, score))
        .collect();

    let gaps_from_winner = played
        .iter()
        .map(|&(session, score)| {
            session
                .winner()
                .map_or(0, |winner| winner.score.saturating_sub(score))
        })
        .collect();

    PlayerStats {
        player_id: player.id,
        name: player.name.clone(),
        wins,
        losses: total_games - wins,
        avg_score,
        total_games,
        experience: total_games,
        skill,
        stability,
        score_trend,
        last_place_count,
        max_gap: gaps.iter().copied().max().unwrap_or(0),
        min_gap: gaps.iter().copied().min().unwrap_or(0),
        gaps_from_winner,
    }
}

/// Distance from `score` to the closest other score in the session.
///
/// Scores are sorted ascending and the first position holding `score` is
/// used, so a shared score can yield a gap of 0. Sessions without a rival
/// have no gap.
pub(crate) fn nearest_rival_gap(session: &GameSession, score: u32) -> Option<u32> {
    let mut sorted: Vec<u32> = session.entries.iter().map(|e| e.score).collect();
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort_unstable();

    let index = sorted.iter().position(|&s| s == score)?;
    let last = sorted.len() - 1;
    let gap = if index == 0 {
        sorted[1] - score
    } else if index == last {
        score - sorted[index - 1]
    } else {
        (score - sorted[index - 1]).min(sorted[index + 1] - score)
    };
    Some(gap)
}
