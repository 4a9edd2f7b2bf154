//! Invariants that live in the schema rather than in Rust: the partial
//! unique index on live moves and the guarded slot-claim UPDATEs. These
//! need a migrated Postgres, so they are opt-in:
//!
//!   DATABASE_URL=postgres://... cargo test --test storage_invariants -- --ignored

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use bracket_royale_server::db::{matchup_repo, move_repo, participant_repo};
use bracket_royale_server::errors::EngineError;
use bracket_royale_server::game::engine;
use bracket_royale_server::game::types::Move;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a migrated DB");
    PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect")
}

async fn two_player_game(db: &PgPool, creator: Uuid) -> Uuid {
    let outbound = engine::create_game(db, creator, Some(1.0), 2, "BATTLE_ROYALE".into())
        .await
        .expect("create");
    // GameCreated is broadcast to the lobby with the fresh id.
    outbound
        .iter()
        .find_map(|o| match &o.msg {
            bracket_royale_server::protocol::ServerMsg::GameCreated { game } => Some(game.game.id),
            _ => None,
        })
        .expect("GameCreated outbound")
}

#[tokio::test]
#[ignore = "needs a migrated Postgres at DATABASE_URL"]
async fn duplicate_move_is_rejected_at_write_time() {
    let db = pool().await;
    let creator = Uuid::new_v4();
    let opponent = Uuid::new_v4();

    let game_id = two_player_game(&db, creator).await;
    engine::join_game(&db, opponent, game_id).await.expect("join");
    engine::start_game(&db, creator, game_id).await.expect("start");

    let first = engine::submit_move(&db, creator, game_id, 1, Move::Rock)
        .await
        .expect("first submission");
    assert!(!first.is_empty());

    // Same (game, player, round) key again: the partial unique index on
    // live moves refuses it even if every in-process guard were bypassed.
    let second = engine::submit_move(&db, creator, game_id, 1, Move::Paper).await;
    assert!(matches!(second, Err(EngineError::Conflict(_))));

    // The original record is untouched.
    let live = move_repo::active_move(&db, game_id, creator, 1)
        .await
        .expect("query")
        .expect("live move present");
    assert_eq!(live.mv, Move::Rock);
    assert!(!live.superseded);
}

#[tokio::test]
#[ignore = "needs a migrated Postgres at DATABASE_URL"]
async fn racing_joins_never_double_fill_the_last_slot() {
    let db = pool().await;
    let creator = Uuid::new_v4();
    let game_id = two_player_game(&db, creator).await;

    // Two players race for the single remaining seat. The slot-claim
    // UPDATE's `player1_id IS DISTINCT FROM` / `winner_id IS NULL` guards
    // make exactly one of them win regardless of interleaving.
    let (pa, pb) = (Uuid::new_v4(), Uuid::new_v4());
    let (ra, rb) = tokio::join!(
        engine::join_game(&db, pa, game_id),
        engine::join_game(&db, pb, game_id),
    );

    assert!(
        ra.is_ok() ^ rb.is_ok(),
        "exactly one join must succeed: {ra:?} / {rb:?}"
    );
    let loser = if ra.is_ok() { rb } else { ra };
    assert!(matches!(loser, Err(EngineError::Conflict(_))));

    let seated = participant_repo::count(&db, game_id).await.expect("count");
    assert_eq!(seated, 2);

    // Both round-1 slots of the single matchup are filled, no slot twice.
    let bracket = matchup_repo::by_round(&db, game_id, 1).await.expect("bracket");
    let m = &bracket[0];
    assert!(m.player1_id.is_some() && m.player2_id.is_some());
    assert_ne!(m.player1_id, m.player2_id);
}
