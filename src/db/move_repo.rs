//! Append-only move log. A partial unique index on
//! (game_id, player_id, round) WHERE NOT superseded enforces the
//! one-live-record-per-round invariant at write time.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::db::models::MoveRecord;
use crate::errors::{EngineError, EngineResult};
use crate::game::types::Move;

/// Log one move. A duplicate submission for the same (game, player, round)
/// trips the unique index and surfaces as a Conflict; the first record is
/// left untouched.
pub async fn insert<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    player_id: Uuid,
    round: i32,
    mv: Move,
) -> EngineResult<MoveRecord> {
    let res = sqlx::query_as::<_, MoveRecord>(
        r#"INSERT INTO move_records (game_id, player_id, round, "move")
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(game_id)
    .bind(player_id)
    .bind(round)
    .bind(mv)
    .fetch_one(ex)
    .await;

    match res {
        Ok(record) => Ok(record),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(EngineError::conflict(
            "You have already submitted a move for this round.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// The player's live (non-superseded) move for a round, if submitted.
pub async fn active_move<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    player_id: Uuid,
    round: i32,
) -> EngineResult<Option<MoveRecord>> {
    let row = sqlx::query_as::<_, MoveRecord>(
        r#"SELECT * FROM move_records
           WHERE game_id = $1 AND player_id = $2 AND round = $3 AND NOT superseded"#,
    )
    .bind(game_id)
    .bind(player_id)
    .bind(round)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

/// Void a tied pair so both players can resubmit. The records stay in the
/// log for auditing; only the unique-index slot is freed.
pub async fn supersede<'e>(ex: impl PgExecutor<'e>, record_ids: &[Uuid]) -> EngineResult<()> {
    sqlx::query("UPDATE move_records SET superseded = TRUE WHERE id = ANY($1)")
        .bind(record_ids)
        .execute(ex)
        .await?;
    Ok(())
}
