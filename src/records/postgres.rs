use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::models::{
    GameId, GameSession, MeepleColor, PlayerDraft, PlayerId, PlayerRecord, RecordSnapshot,
    ScoreEntry, SessionDraft,
};
use super::repository::{duplicate_name, GameRepository, PlayerRepository, RecordStore};
use crate::shared::AppError;

/// Schema applied by `init_schema`. `seat` keeps entries in the order they
/// were recorded, which decides tie-breaks.
const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        frame_id INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS players_name_key ON players (name)",
    "CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY,
        date DATE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS game_players (
        game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
        player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        seat INTEGER NOT NULL,
        score INTEGER NOT NULL CHECK (score >= 0),
        color TEXT,
        PRIMARY KEY (game_id, player_id)
    )",
];

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, context, "Database operation failed");
        AppError::DatabaseError(e.to_string())
    }
}

/// Like `db_error`, but a clash on the unique name index is bad input.
fn player_write_error(name: &str) -> impl Fn(sqlx::Error) -> AppError + '_ {
    move |e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => duplicate_name(name),
        _ => db_error("write player")(e),
    }
}

async fn fetch_players(conn: &mut PgConnection) -> Result<Vec<PlayerRecord>, AppError> {
    let rows = sqlx::query("SELECT id, name, frame_id FROM players ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("list players"))?;

    Ok(rows
        .into_iter()
        .map(|row| PlayerRecord {
            id: row.get("id"),
            name: row.get("name"),
            display_frame: row.get("frame_id"),
        })
        .collect())
}

async fn fetch_sessions(conn: &mut PgConnection) -> Result<Vec<GameSession>, AppError> {
    let game_rows = sqlx::query("SELECT id, date FROM games ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("list games"))?;

    let mut sessions: BTreeMap<GameId, GameSession> = BTreeMap::new();
    for row in game_rows {
        let id: GameId = row.get("id");
        let date: NaiveDate = row.get("date");
        sessions.insert(
            id,
            GameSession {
                id,
                date,
                entries: Vec::new(),
            },
        );
    }

    let entry_rows = sqlx::query(
        "SELECT game_id, player_id, score, color FROM game_players ORDER BY game_id, seat",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("list game players"))?;

    for row in entry_rows {
        let game_id: GameId = row.get("game_id");
        let score: i32 = row.get("score");
        let color: Option<String> = row.get("color");
        let color = color
            .map(|name| {
                MeepleColor::from_str(&name).map_err(|_| {
                    AppError::DatabaseError(format!("unknown color {:?} stored", name))
                })
            })
            .transpose()?;

        if let Some(session) = sessions.get_mut(&game_id) {
            session.entries.push(ScoreEntry {
                player_id: row.get("player_id"),
                score: u32::try_from(score).map_err(|_| {
                    AppError::DatabaseError(format!("negative score {} stored", score))
                })?,
                color,
            });
        }
    }

    Ok(sessions.into_values().collect())
}

/// PostgreSQL implementation of the record store
///
/// Ids for new rows are `max + 1`, allocated while holding an EXCLUSIVE
/// table lock so concurrent creates queue up instead of sharing an id.
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn init_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error("init schema"))?;
        }
        debug!("Record schema ready");
        Ok(())
    }

    async fn insert_entries(
        tx: &mut Transaction<'_, Postgres>,
        game_id: GameId,
        entries: &[ScoreEntry],
    ) -> Result<(), AppError> {
        for (seat, entry) in entries.iter().enumerate() {
            let score = i32::try_from(entry.score).map_err(|_| {
                AppError::Validation(format!("score {} is out of range", entry.score))
            })?;
            sqlx::query(
                "INSERT INTO game_players (game_id, player_id, seat, score, color) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(game_id)
            .bind(entry.player_id)
            .bind(seat as i32)
            .bind(score)
            .bind(entry.color.map(|c| c.to_string()))
            .execute(&mut **tx)
            .await
            .map_err(db_error("insert game player"))?;
        }
        Ok(())
    }

    /// Writes a session under a known id, replacing any previous version.
    async fn write_session(
        tx: &mut Transaction<'_, Postgres>,
        session: &GameSession,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO games (id, date) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET date = EXCLUDED.date",
        )
        .bind(session.id)
        .bind(session.date)
        .execute(&mut **tx)
        .await
        .map_err(db_error("upsert game"))?;

        sqlx::query("DELETE FROM game_players WHERE game_id = $1")
            .bind(session.id)
            .execute(&mut **tx)
            .await
            .map_err(db_error("clear game players"))?;

        Self::insert_entries(tx, session.id, &session.entries).await
    }

    /// Inserts a new game row under the next free id.
    async fn create_game(
        tx: &mut Transaction<'_, Postgres>,
        date: NaiveDate,
    ) -> Result<GameId, AppError> {
        sqlx::query("LOCK TABLE games IN EXCLUSIVE MODE")
            .execute(&mut **tx)
            .await
            .map_err(db_error("lock games"))?;

        let row = sqlx::query(
            "INSERT INTO games (id, date) SELECT COALESCE(MAX(id), 0) + 1, $1 FROM games RETURNING id",
        )
        .bind(date)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("insert game"))?;
        Ok(row.get("id"))
    }
}

#[async_trait]
impl GameRepository for PostgresRecordStore {
    #[instrument(skip(self))]
    async fn list_sessions(&self) -> Result<Vec<GameSession>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire"))?;
        let sessions = fetch_sessions(&mut conn).await?;
        debug!(session_count = sessions.len(), "Listed sessions from database");
        Ok(sessions)
    }

    #[instrument(skip(self, draft))]
    async fn upsert_session(&self, draft: SessionDraft) -> Result<GameId, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin"))?;

        let id = match draft.id {
            Some(id) => {
                let session = GameSession {
                    id,
                    date: draft.date,
                    entries: draft.entries,
                };
                Self::write_session(&mut tx, &session).await?;
                id
            }
            None => {
                let id = Self::create_game(&mut tx, draft.date).await?;
                Self::insert_entries(&mut tx, id, &draft.entries).await?;
                id
            }
        };
        tx.commit().await.map_err(db_error("commit"))?;

        debug!(game_id = id, "Session stored in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, game_id: GameId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(game_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete game"))?;

        if result.rows_affected() == 0 {
            warn!(game_id, "Session not found for deletion");
            return Err(AppError::NotFound(format!("Game {} not found", game_id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM games")
            .execute(&self.pool)
            .await
            .map_err(db_error("delete all games"))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PlayerRepository for PostgresRecordStore {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerRecord>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire"))?;
        fetch_players(&mut conn).await
    }

    #[instrument(skip(self, draft))]
    async fn upsert_player(&self, draft: PlayerDraft) -> Result<PlayerId, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin"))?;

        let id = match draft.id {
            Some(id) => {
                sqlx::query(
                    "INSERT INTO players (id, name, frame_id) VALUES ($1, $2, $3)
                     ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, frame_id = EXCLUDED.frame_id",
                )
                .bind(id)
                .bind(&draft.name)
                .bind(draft.display_frame)
                .execute(&mut *tx)
                .await
                .map_err(player_write_error(&draft.name))?;
                id
            }
            None => {
                sqlx::query("LOCK TABLE players IN EXCLUSIVE MODE")
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("lock players"))?;

                sqlx::query(
                    "INSERT INTO players (id, name, frame_id)
                     SELECT COALESCE(MAX(id), 0) + 1, $1, $2 FROM players RETURNING id",
                )
                .bind(&draft.name)
                .bind(draft.display_frame)
                .fetch_one(&mut *tx)
                .await
                .map_err(player_write_error(&draft.name))?
                .get("id")
            }
        };

        tx.commit().await.map_err(db_error("commit"))?;
        debug!(player_id = id, "Player stored in database");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, player_id: PlayerId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete player"))?;

        if result.rows_affected() == 0 {
            warn!(player_id, "Player not found for deletion");
            return Err(AppError::NotFound(format!(
                "Player {} not found",
                player_id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_players(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM players")
            .execute(&self.pool)
            .await
            .map_err(db_error("delete all players"))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, players, sessions))]
    async fn replace_all(
        &self,
        players: Vec<PlayerRecord>,
        sessions: Vec<GameSession>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin"))?;

        for statement in [
            "DELETE FROM game_players",
            "DELETE FROM games",
            "DELETE FROM players",
        ] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(db_error("clear tables"))?;
        }

        for player in &players {
            sqlx::query("INSERT INTO players (id, name, frame_id) VALUES ($1, $2, $3)")
                .bind(player.id)
                .bind(&player.name)
                .bind(player.display_frame)
                .execute(&mut *tx)
                .await
                .map_err(player_write_error(&player.name))?;
        }

        for session in &sessions {
            Self::write_session(&mut tx, session).await?;
        }

        tx.commit().await.map_err(db_error("commit"))?;
        debug!(
            player_count = players.len(),
            session_count = sessions.len(),
            "Database contents replaced"
        );
        Ok(())
    }

    /// Both reads run in one REPEATABLE READ transaction, so every entry
    /// refers to a player present in the same snapshot.
    #[instrument(skip(self))]
    async fn snapshot(&self) -> Result<RecordSnapshot, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin"))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db_error("snapshot isolation"))?;

        let players = fetch_players(&mut tx).await?;
        let sessions = fetch_sessions(&mut tx).await?;
        tx.commit().await.map_err(db_error("commit"))?;

        Ok(RecordSnapshot { players, sessions })
    }
}
