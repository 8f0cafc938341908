use std::collections::HashSet;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::BackupError;
use crate::records::{
    service::parse_session_date, GameId, GameSession, MeepleColor, PlayerId, PlayerRecord,
    ScoreEntry,
};

const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPlayer {
    pub id: PlayerId,
    pub name: String,
    pub frame_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupGamePlayer {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupGame {
    pub id: GameId,
    pub date: String,
    pub game_players: Vec<BackupGamePlayer>,
}

/// Full export of the record store, the shape persisted in backup files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub players: Vec<BackupPlayer>,
    pub games: Vec<BackupGame>,
}

impl BackupDocument {
    pub fn from_records(players: &[PlayerRecord], sessions: &[GameSession]) -> Self {
        let players = players
            .iter()
            .map(|player| BackupPlayer {
                id: player.id,
                name: player.name.clone(),
                frame_id: player.display_frame,
            })
            .collect();

        let games = sessions
            .iter()
            .map(|session| BackupGame {
                id: session.id,
                date: session.date.format(BACKUP_DATE_FORMAT).to_string(),
                game_players: session
                    .entries
                    .iter()
                    .map(|entry| BackupGamePlayer {
                        game_id: session.id,
                        player_id: entry.player_id,
                        score: entry.score,
                        color: entry.color.map(|c| c.to_string()),
                    })
                    .collect(),
            })
            .collect();

        Self { players, games }
    }

    /// Converts back into store records, rejecting anything the store would
    /// refuse: dangling player references, repeated ids, unknown colors.
    pub fn into_records(self) -> Result<(Vec<PlayerRecord>, Vec<GameSession>), BackupError> {
        let mut player_ids = HashSet::new();
        let mut players = Vec::with_capacity(self.players.len());
        for player in self.players {
            if !player_ids.insert(player.id) {
                return Err(BackupError::InvalidRecord(format!(
                    "player {} appears more than once",
                    player.id
                )));
            }
            players.push(PlayerRecord {
                id: player.id,
                name: player.name,
                display_frame: player.frame_id,
            });
        }

        let mut game_ids = HashSet::new();
        let mut sessions = Vec::with_capacity(self.games.len());
        for game in self.games {
            if !game_ids.insert(game.id) {
                return Err(BackupError::InvalidRecord(format!(
                    "game {} appears more than once",
                    game.id
                )));
            }
            let date = parse_session_date(&game.date).map_err(|_| {
                BackupError::InvalidRecord(format!("game {} has invalid date {:?}", game.id, game.date))
            })?;

            let mut seated = HashSet::new();
            let mut entries = Vec::with_capacity(game.game_players.len());
            for gp in game.game_players {
                if gp.game_id != game.id {
                    return Err(BackupError::InvalidRecord(format!(
                        "entry for game {} listed under game {}",
                        gp.game_id, game.id
                    )));
                }
                if !player_ids.contains(&gp.player_id) {
                    return Err(BackupError::InvalidRecord(format!(
                        "game {} references unknown player {}",
                        game.id, gp.player_id
                    )));
                }
                if !seated.insert(gp.player_id) {
                    return Err(BackupError::InvalidRecord(format!(
                        "game {} lists player {} more than once",
                        game.id, gp.player_id
                    )));
                }
                let color = gp
                    .color
                    .as_deref()
                    .map(|raw| {
                        MeepleColor::from_str(raw).map_err(|_| {
                            BackupError::InvalidRecord(format!("unknown color {:?}", raw))
                        })
                    })
                    .transpose()?;

                entries.push(ScoreEntry {
                    player_id: gp.player_id,
                    score: gp.score,
                    color,
                });
            }

            sessions.push(GameSession {
                id: game.id,
                date,
                entries,
            });
        }

        Ok((players, sessions))
    }

    /// JSON wrapped in standard base64.
    pub fn encode(&self) -> Result<String, BackupError> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Accepts line-wrapped payloads; all whitespace is dropped before decoding.
    pub fn decode(encoded: &str) -> Result<Self, BackupError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let json = STANDARD.decode(compact)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
