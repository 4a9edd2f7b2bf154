//! Bracket-node persistence. Slot claims and winner recording are guarded
//! `UPDATE … WHERE` compare-and-swaps keyed by matchup id, so two racing
//! writers can never land in the same slot or resolve a matchup twice.

use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::db::models::Matchup;
use crate::errors::EngineResult;
use crate::game::types::Slot;

pub async fn by_game<'e>(ex: impl PgExecutor<'e>, game_id: Uuid) -> EngineResult<Vec<Matchup>> {
    let rows = sqlx::query_as::<_, Matchup>(
        "SELECT * FROM matchups WHERE game_id = $1 ORDER BY round, slot_index",
    )
    .bind(game_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn by_round<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    round: i32,
) -> EngineResult<Vec<Matchup>> {
    let rows = sqlx::query_as::<_, Matchup>(
        "SELECT * FROM matchups WHERE game_id = $1 AND round = $2 ORDER BY slot_index",
    )
    .bind(game_id)
    .bind(round)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn find_at<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    round: i32,
    slot_index: i32,
) -> EngineResult<Option<Matchup>> {
    let row = sqlx::query_as::<_, Matchup>(
        "SELECT * FROM matchups WHERE game_id = $1 AND round = $2 AND slot_index = $3",
    )
    .bind(game_id)
    .bind(round)
    .bind(slot_index)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

/// The matchup a player occupies in `round`, if any. A player holds at most
/// one slot per round.
pub async fn find_for_player<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    round: i32,
    player_id: Uuid,
) -> EngineResult<Option<Matchup>> {
    let row = sqlx::query_as::<_, Matchup>(
        r#"SELECT * FROM matchups
           WHERE game_id = $1 AND round = $2 AND (player1_id = $3 OR player2_id = $3)"#,
    )
    .bind(game_id)
    .bind(round)
    .bind(player_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

/// Claim the first empty slot of one matchup: player1 first, then player2.
/// Returns the slot taken, or None when the matchup is full or resolved.
pub async fn claim_slot(
    conn: &mut PgConnection,
    matchup_id: Uuid,
    player_id: Uuid,
) -> EngineResult<Option<Slot>> {
    let p1 = sqlx::query(
        r#"UPDATE matchups SET player1_id = $2
           WHERE id = $1 AND player1_id IS NULL AND winner_id IS NULL"#,
    )
    .bind(matchup_id)
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    if p1.rows_affected() == 1 {
        return Ok(Some(Slot::P1));
    }

    let p2 = sqlx::query(
        r#"UPDATE matchups SET player2_id = $2
           WHERE id = $1 AND player2_id IS NULL
             AND player1_id IS DISTINCT FROM $2 AND winner_id IS NULL"#,
    )
    .bind(matchup_id)
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    if p2.rows_affected() == 1 {
        return Ok(Some(Slot::P2));
    }
    Ok(None)
}

/// Record the winner exactly once. False means the matchup was already
/// resolved (or the id does not hold that player), so the caller must treat
/// the resolution as lost to a concurrent writer.
pub async fn set_winner<'e>(
    ex: impl PgExecutor<'e>,
    matchup_id: Uuid,
    winner_id: Uuid,
) -> EngineResult<bool> {
    let res = sqlx::query(
        r#"UPDATE matchups SET winner_id = $2
           WHERE id = $1 AND winner_id IS NULL
             AND (player1_id = $2 OR player2_id = $2)"#,
    )
    .bind(matchup_id)
    .bind(winner_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected() == 1)
}

/// Matchups of `round` still waiting for a winner. Zero means the round is
/// complete and the bracket may advance.
pub async fn unresolved_in_round<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    round: i32,
) -> EngineResult<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM matchups WHERE game_id = $1 AND round = $2 AND winner_id IS NULL",
    )
    .bind(game_id)
    .bind(round)
    .fetch_one(ex)
    .await?;
    Ok(n)
}
