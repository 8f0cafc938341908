use carstat::records::{
    types::{EntryRequest, SaveSessionRequest},
    GameSession, MeepleColor,
};
use strum::IntoEnumIterator;

use super::setup::TestSetup;

/// Builds a session request the way the edit screen would: one color per seat,
/// handed out in palette order.
pub struct SessionBuilder {
    date: String,
    scores: Vec<(String, u32)>,
}

impl SessionBuilder {
    pub fn on(date: &str) -> Self {
        Self {
            date: date.to_string(),
            scores: vec![],
        }
    }

    pub fn score(mut self, player: &str, score: u32) -> Self {
        self.scores.push((player.to_string(), score));
        self
    }

    pub fn request(&self, setup: &TestSetup) -> SaveSessionRequest {
        let entries = self
            .scores
            .iter()
            .zip(MeepleColor::iter())
            .map(|((player, score), color)| EntryRequest {
                player_id: setup.player_id(player),
                score: *score,
                color: Some(color),
            })
            .collect();

        SaveSessionRequest {
            id: None,
            date: self.date.clone(),
            entries,
        }
    }

    pub async fn save(self, setup: &TestSetup) -> GameSession {
        setup
            .records
            .save_session(self.request(setup))
            .await
            .expect("session should be saved")
    }
}
