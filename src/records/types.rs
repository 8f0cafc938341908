use serde::{Deserialize, Serialize};

use super::models::{GameId, MeepleColor, PlayerId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    pub player_id: PlayerId,
    pub score: u32,
    pub color: Option<MeepleColor>,
}

/// Request body for recording a new game or replacing an existing one.
///
/// `date` accepts `yyyy-MM-dd` or `dd.MM.yyyy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSessionRequest {
    #[serde(default)]
    pub id: Option<GameId>,
    pub date: String,
    pub entries: Vec<EntryRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
