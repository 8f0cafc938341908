use super::mean;
use crate::records::{GameSession, PlayerRecord};
use crate::stats::PlayerProfile;

/// Places always reported, even when nobody has finished that low yet.
pub const MIN_REPORTED_PLACES: usize = 3;

pub fn calculate_player_profile(player: &PlayerRecord, sessions: &[GameSession]) -> PlayerProfile {
    let scores: Vec<u32> = sessions
        .iter()
        .filter_map(|session| session.entry_for(player.id).map(|entry| entry.score))
        .collect();

    let mut placements = vec![0u32; MIN_REPORTED_PLACES];
    for session in sessions {
        let place = session
            .standings()
            .iter()
            .position(|entry| entry.player_id == player.id);
        if let Some(index) = place {
            if placements.len() <= index {
                placements.resize(index + 1, 0);
            }
            placements[index] += 1;
        }
    }

    PlayerProfile {
        player_id: player.id,
        name: player.name.clone(),
        games_played: scores.len() as u32,
        max_score: scores.iter().copied().max().unwrap_or(0),
        total_score: scores.iter().map(|&s| u64::from(s)).sum(),
        avg_score: mean(&scores).round() as u32,
        placements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PlayerId, ScoreEntry};
    use chrono::NaiveDate;

    fn session(id: i32, scores: &[(PlayerId, u32)]) -> GameSession {
        GameSession {
            id,
            date: NaiveDate::from_ymd_opt(2024, 6, id as u32).unwrap(),
            entries: scores
                .iter()
                .map(|&(player_id, score)| ScoreEntry::new(player_id, score))
                .collect(),
        }
    }

    fn anna() -> PlayerRecord {
        PlayerRecord {
            id: 1,
            name: "Anna".into(),
            display_frame: 3,
        }
    }

    #[test]
    fn profile_without_games() {
        let profile = calculate_player_profile(&anna(), &[session(1, &[(2, 10)])]);

        assert_eq!(profile.games_played, 0);
        assert_eq!(profile.max_score, 0);
        assert_eq!(profile.total_score, 0);
        assert_eq!(profile.avg_score, 0);
        assert_eq!(profile.placements, vec![0, 0, 0]);
    }

    #[test]
    fn profile_totals_and_rounding() {
        let sessions = vec![
            session(1, &[(1, 10), (2, 20)]),
            session(2, &[(1, 31), (2, 5)]),
            session(3, &[(2, 8)]),
        ];
        let profile = calculate_player_profile(&anna(), &sessions);

        assert_eq!(profile.games_played, 2);
        assert_eq!(profile.max_score, 31);
        assert_eq!(profile.total_score, 41);
        // 20.5 rounds up.
        assert_eq!(profile.avg_score, 21);
        assert_eq!(profile.placements, vec![1, 1, 0]);
    }

    #[test]
    fn placements_grow_past_third() {
        let sessions = vec![
            session(1, &[(2, 40), (3, 30), (4, 20), (5, 15), (1, 10)]),
            session(2, &[(1, 40), (2, 30)]),
        ];
        let profile = calculate_player_profile(&anna(), &sessions);
        assert_eq!(profile.placements, vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn tied_first_place_goes_to_earlier_entry() {
        let sessions = vec![session(1, &[(2, 25), (1, 25)])];
        let profile = calculate_player_profile(&anna(), &sessions);
        assert_eq!(profile.placements, vec![0, 1, 0]);
    }
}
