//! One async task per live game: the single logical owner of that game's
//! state. All mutating events for a game flow through its actor's channel,
//! so joins, starts, submissions and leaves are serialized per game while
//! different games stay fully independent. Lobby-level requests (create,
//! browse) have no game to own and run inline.

use dashmap::{mapref::entry::Entry, DashMap};
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Client as RedisClient};
use sqlx::PgPool;
use tokio::{
    sync::mpsc,
    time::{sleep, Duration},
};
use uuid::Uuid;

use crate::config::settings;
use crate::db::participant_repo;
use crate::game::engine::{self, Audience, Outbound};
use crate::protocol::{ClientMsg, ServerMsg};

/// In-memory map of active actors: game_id → sender.
static SESSIONS: Lazy<DashMap<Uuid, mpsc::Sender<Command>>> = Lazy::new(DashMap::new);

/// One inbound event plus the authenticated identity the WS layer attached.
#[derive(Debug)]
struct Command {
    player_id: Uuid,
    msg: ClientMsg,
}

#[derive(Debug)]
pub enum DispatchErr {
    ChannelClosed,
}

/// Entry point from the WS layer. Routes game-scoped events to the owning
/// actor (spawning it on demand); lobby-scoped events run inline.
pub async fn dispatch(
    db: PgPool,
    redis: RedisClient,
    player_id: Uuid,
    msg: ClientMsg,
) -> Result<(), DispatchErr> {
    crate::metrics::GAME_EVENTS
        .with_label_values(&[msg.name()])
        .inc();

    let Some(game_id) = msg.game_id() else {
        let result = match msg {
            ClientMsg::CreateGame {
                buy_in,
                max_players,
                game_type,
            } => engine::create_game(&db, player_id, buy_in, max_players, game_type).await,
            ClientMsg::FetchOpenGames => engine::fetch_open_games(&db, player_id).await,
            _ => unreachable!("game-scoped message without game id"),
        };
        deliver(&db, &redis, player_id, result).await;
        return Ok(());
    };

    let mut cmd = Command { player_id, msg };

    // A send can race with the target actor shutting itself down (idle
    // timeout or game end). The SendError hands the command back, so retry
    // once against a freshly spawned actor.
    for _ in 0..2 {
        let tx = match SESSIONS.entry(game_id) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let (tx, rx) = mpsc::channel::<Command>(64);
                vacant.insert(tx.clone());
                spawn_actor(db.clone(), redis.clone(), game_id, tx.clone(), rx);
                tx
            }
        };

        match tx.send(cmd).await {
            Ok(()) => return Ok(()),
            Err(mpsc::error::SendError(returned)) => {
                // Evict only the sender we failed on; a replacement actor
                // may already have registered itself.
                SESSIONS.remove_if(&game_id, |_, s| s.same_channel(&tx));
                cmd = returned;
            }
        }
    }

    Err(DispatchErr::ChannelClosed)
}

/// Run one game's actor until the game ends or the channel goes idle. The
/// actor deregisters only its own sender, so it never tears down a
/// successor registered under the same game id.
fn spawn_actor(
    db: PgPool,
    redis: RedisClient,
    game_id: Uuid,
    own_tx: mpsc::Sender<Command>,
    mut rx: mpsc::Receiver<Command>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_cmd = rx.recv() => {
                    let Some(Command { player_id, msg }) = maybe_cmd else { break };
                    let result = handle(&db, player_id, msg).await;
                    let ended = matches!(
                        &result,
                        Ok(out) if out.iter().any(|o| matches!(o.msg, ServerMsg::GameEnded { .. }))
                    );
                    deliver(&db, &redis, player_id, result).await;
                    if ended {
                        break;
                    }
                }
                // Nobody has touched the game in a while; shut down. The
                // actor respawns on the next event for this game.
                _ = sleep(Duration::from_secs(settings().session_idle)) => break,
            }
        }
        SESSIONS.remove_if(&game_id, |_, s| s.same_channel(&own_tx));
        log::debug!("session actor for game {game_id} stopped");
    });
}

async fn handle(
    db: &PgPool,
    player_id: Uuid,
    msg: ClientMsg,
) -> Result<Vec<Outbound>, crate::errors::EngineError> {
    match msg {
        ClientMsg::JoinGame { game_id } => engine::join_game(db, player_id, game_id).await,
        ClientMsg::StartGame { game_id } => engine::start_game(db, player_id, game_id).await,
        ClientMsg::SubmitMove { game_id, round, mv } => {
            engine::submit_move(db, player_id, game_id, round, mv).await
        }
        ClientMsg::LeaveGame { game_id } => engine::leave_game(db, player_id, game_id).await,
        ClientMsg::UpdateGameState { game_id, state } => {
            engine::update_game_state(db, player_id, game_id, state).await
        }
        ClientMsg::CreateGame { .. } | ClientMsg::FetchOpenGames => {
            unreachable!("lobby message routed to a game actor")
        }
    }
}

/// Publish a handler's outcome. Failures go to the originator only; storage
/// details stay in the server log.
async fn deliver(
    db: &PgPool,
    redis: &RedisClient,
    origin: Uuid,
    result: Result<Vec<Outbound>, crate::errors::EngineError>,
) {
    match result {
        Ok(outbound) => {
            for out in outbound {
                publish(db, redis, out).await;
            }
        }
        Err(e) => {
            log::warn!("handler error for player {origin}: {e}");
            publish(
                db,
                redis,
                Outbound {
                    to: Audience::Player(origin),
                    msg: ServerMsg::Error {
                        message: e.client_message(),
                    },
                },
            )
            .await;
        }
    }
}

/// Fan one message out over Redis. A room broadcast publishes to each
/// participant's private channel; the lobby channel reaches every socket.
async fn publish(db: &PgPool, redis: &RedisClient, out: Outbound) {
    let json = serde_json::to_string(&out.msg).unwrap();
    let Ok(mut conn) = redis.get_multiplexed_async_connection().await else {
        log::error!("redis unavailable, dropping outbound message");
        return;
    };

    match out.to {
        Audience::Lobby => {
            let _: () = conn.publish("lobby:events", json).await.unwrap_or(());
        }
        Audience::Player(pid) => {
            let _: () = conn
                .publish(format!("player:{pid}:events"), json)
                .await
                .unwrap_or(());
        }
        Audience::Game(game_id) => match participant_repo::list(db, game_id).await {
            Ok(participants) => {
                for p in participants {
                    let _: () = conn
                        .publish(format!("player:{}:events", p.player_id), json.clone())
                        .await
                        .unwrap_or(());
                }
            }
            Err(e) => log::error!("room broadcast for game {game_id} failed: {e}"),
        },
    }
}
