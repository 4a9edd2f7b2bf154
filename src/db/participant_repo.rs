use sqlx::PgExecutor;
use uuid::Uuid;

use crate::db::models::GameParticipant;
use crate::errors::EngineResult;

/// Register a player, or reset the eliminated flag for a returning leaver.
/// The caller guards that the game is still OPEN before allowing a re-join.
pub async fn upsert_join<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    player_id: Uuid,
) -> EngineResult<()> {
    sqlx::query(
        r#"INSERT INTO game_participants (game_id, player_id)
           VALUES ($1, $2)
           ON CONFLICT (game_id, player_id) DO UPDATE SET eliminated = FALSE"#,
    )
    .bind(game_id)
    .bind(player_id)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn count<'e>(ex: impl PgExecutor<'e>, game_id: Uuid) -> EngineResult<i64> {
    let n: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM game_participants WHERE game_id = $1")
            .bind(game_id)
            .fetch_one(ex)
            .await?;
    Ok(n)
}

pub async fn find<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    player_id: Uuid,
) -> EngineResult<Option<GameParticipant>> {
    let row = sqlx::query_as::<_, GameParticipant>(
        "SELECT * FROM game_participants WHERE game_id = $1 AND player_id = $2",
    )
    .bind(game_id)
    .bind(player_id)
    .fetch_optional(ex)
    .await?;
    Ok(row)
}

pub async fn list<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
) -> EngineResult<Vec<GameParticipant>> {
    let rows = sqlx::query_as::<_, GameParticipant>(
        "SELECT * FROM game_participants WHERE game_id = $1 ORDER BY joined_at",
    )
    .bind(game_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Mark a participant out of the running. The flag is monotonic: only an
/// explicit re-join to a still-OPEN game (see [`upsert_join`]) resets it.
/// Returns false when the player was already eliminated or unknown.
pub async fn eliminate<'e>(
    ex: impl PgExecutor<'e>,
    game_id: Uuid,
    player_id: Uuid,
) -> EngineResult<bool> {
    let res = sqlx::query(
        r#"UPDATE game_participants SET eliminated = TRUE
           WHERE game_id = $1 AND player_id = $2 AND eliminated = FALSE"#,
    )
    .bind(game_id)
    .bind(player_id)
    .execute(ex)
    .await?;
    Ok(res.rows_affected() == 1)
}
