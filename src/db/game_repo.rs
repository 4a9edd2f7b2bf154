//! Game-row persistence. Every multi-step mutation is transactional and
//! every status/round change is a guarded compare-and-swap, so a second
//! engine instance racing on the same game can never apply it twice.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::db::models::Game;
use crate::errors::{EngineError, EngineResult};
use crate::game::bracket::MatchupSeed;

/// Insert the game row, its full empty bracket and the creator's participant
/// and round-1 slot in one transaction; a partial bracket never persists.
pub async fn create(
    db: &PgPool,
    buy_in: f64,
    max_players: i32,
    game_type: &str,
    creator_id: Uuid,
    seeds: &[MatchupSeed],
) -> EngineResult<Game> {
    let mut tx = db.begin().await?;

    let game: Game = sqlx::query_as(
        r#"INSERT INTO games (buy_in, max_players, game_type, status, current_round)
           VALUES ($1, $2, $3, 'OPEN', 0)
           RETURNING *"#,
    )
    .bind(buy_in)
    .bind(max_players)
    .bind(game_type)
    .fetch_one(&mut *tx)
    .await?;

    for seed in seeds {
        sqlx::query("INSERT INTO matchups (game_id, round, slot_index) VALUES ($1, $2, $3)")
            .bind(game.id)
            .bind(seed.round)
            .bind(seed.slot_index)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("INSERT INTO game_participants (game_id, player_id) VALUES ($1, $2)")
        .bind(game.id)
        .bind(creator_id)
        .execute(&mut *tx)
        .await?;

    // Creator takes the first slot of the first round-1 matchup.
    sqlx::query(
        "UPDATE matchups SET player1_id = $2 WHERE game_id = $1 AND round = 1 AND slot_index = 0",
    )
    .bind(game.id)
    .bind(creator_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(game)
}

pub async fn find<'e>(ex: impl PgExecutor<'e>, game_id: Uuid) -> EngineResult<Game> {
    sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1")
        .bind(game_id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| EngineError::not_found("Game not found."))
}

/// An OPEN game together with its current headcount, for lobby browsing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpenGame {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub game: Game,
    pub player_count: i64,
}

pub async fn open_games<'e>(ex: impl PgExecutor<'e>) -> EngineResult<Vec<OpenGame>> {
    let rows = sqlx::query_as::<_, OpenGame>(
        r#"SELECT g.*, COUNT(p.player_id) AS player_count
           FROM games g
           LEFT JOIN game_participants p ON p.game_id = g.id
           WHERE g.status = 'OPEN'
           GROUP BY g.id
           ORDER BY g.created_at DESC"#,
    )
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// OPEN → IN_PROGRESS with round 1. False when the game already left OPEN.
pub async fn start<'e>(ex: impl PgExecutor<'e>, game_id: Uuid) -> EngineResult<bool> {
    let res = sqlx::query(
        r#"UPDATE games
           SET status = 'IN_PROGRESS', current_round = 1, updated_at = now()
           WHERE id = $1 AND status = 'OPEN'"#,
    )
    .bind(game_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Bump `current_round` past a fully-resolved round. The `current_round`
/// guard makes the bump exactly-once even when the last two matchups of the
/// round resolve concurrently.
pub async fn advance_round<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    from_round: i32,
) -> EngineResult<bool> {
    let res = sqlx::query(
        r#"UPDATE games
           SET current_round = current_round + 1, updated_at = now()
           WHERE id = $1 AND status = 'IN_PROGRESS' AND current_round = $2"#,
    )
    .bind(game_id)
    .bind(from_round)
    .execute(ex)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// IN_PROGRESS → CLOSED with the champion recorded. The game row is
/// immutable afterwards.
pub async fn close<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    winner_id: Uuid,
) -> EngineResult<bool> {
    let res = sqlx::query(
        r#"UPDATE games
           SET status = 'CLOSED', winner_id = $2, updated_at = now()
           WHERE id = $1 AND status = 'IN_PROGRESS'"#,
    )
    .bind(game_id)
    .bind(winner_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected() == 1)
}
