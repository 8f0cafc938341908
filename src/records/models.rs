use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub type PlayerId = i32;
pub type GameId = i32;

/// Number of cosmetic frames a player card can be drawn with (1-based).
pub const DISPLAY_FRAME_COUNT: i32 = 3;

/// Meeple colors available at the table. At most one player per color in a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum MeepleColor {
    Yellow,
    Red,
    Green,
    Blue,
    Black,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub score: u32,
    pub color: Option<MeepleColor>,
}

impl ScoreEntry {
    pub fn new(player_id: PlayerId, score: u32) -> Self {
        Self {
            player_id,
            score,
            color: None,
        }
    }

    pub fn with_color(mut self, color: MeepleColor) -> Self {
        self.color = Some(color);
        self
    }
}

/// One finished game. Entry order is the order the store returned them in and
/// decides who is credited when scores tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: GameId,
    pub date: NaiveDate,
    pub entries: Vec<ScoreEntry>,
}

impl GameSession {
    pub fn entry_for(&self, player_id: PlayerId) -> Option<&ScoreEntry> {
        self.entries.iter().find(|entry| entry.player_id == player_id)
    }

    pub fn includes(&self, player_id: PlayerId) -> bool {
        self.entry_for(player_id).is_some()
    }

    /// First entry holding the highest score. A tie for first is not shared.
    pub fn winner(&self) -> Option<&ScoreEntry> {
        self.entries.iter().fold(None, |best, entry| match best {
            Some(current) if current.score >= entry.score => Some(current),
            _ => Some(entry),
        })
    }

    /// First entry holding the lowest score.
    pub fn last_place(&self) -> Option<&ScoreEntry> {
        self.entries.iter().fold(None, |worst, entry| match worst {
            Some(current) if current.score <= entry.score => Some(current),
            _ => Some(entry),
        })
    }

    /// Entries best first. Equal scores keep their entry order, so the
    /// head of the list is always `winner()`.
    pub fn standings(&self) -> Vec<&ScoreEntry> {
        let mut ordered: Vec<&ScoreEntry> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.score.cmp(&a.score));
        ordered
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub display_frame: i32,
}

/// Session to be written; a missing id asks the store to allocate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub id: Option<GameId>,
    pub date: NaiveDate,
    pub entries: Vec<ScoreEntry>,
}

/// Player to be written; a missing id asks the store to allocate one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDraft {
    pub id: Option<PlayerId>,
    pub name: String,
    pub display_frame: i32,
}

/// Players and sessions read together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSnapshot {
    pub players: Vec<PlayerRecord>,
    pub sessions: Vec<GameSession>,
}
