//! WebSocket endpoint with Redis event subscription. The identity
//! collaborator hands us a stable player id per connection; every inbound
//! event is stamped with it so clients cannot act as someone else.

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{handle, Message};
use futures::StreamExt;
use redis::{AsyncCommands, Client as RedisClient};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings;
use crate::game::session::dispatch;
use crate::protocol::{ClientMsg, ServerMsg};

pub async fn ws_index(
    req: HttpRequest,
    body: web::Payload,
    db_pool: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
) -> Result<HttpResponse, Error> {
    // 1 · player_id query param (supplied by the auth proxy)
    let pid_str = req
        .query_string()
        .split('&')
        .find_map(|kv| kv.strip_prefix("player_id="))
        .ok_or_else(|| actix_web::error::ErrorBadRequest("player_id missing"))?;
    let player_id =
        Uuid::parse_str(pid_str).map_err(|_| actix_web::error::ErrorBadRequest("bad UUID"))?;

    // 2 · handshake
    let (response, mut session, mut ws_stream) = handle(&req, body)?;

    // 3 · presence key — written here and expired here; the engine only
    //     ever reads presence through the HTTP query API.
    {
        let mut conn = redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|_| actix_web::error::ErrorInternalServerError("redis"))?;
        let key = format!("session:{player_id}");
        let _: () = conn
            .set_ex(&key, "1", settings().presence_ttl)
            .await
            .unwrap_or(());
    }

    // 4 · Redis subscribe: private channel + lobby announcements
    let mut pubsub = redis
        .get_async_pubsub()
        .await
        .map_err(|_| actix_web::error::ErrorInternalServerError("redis subscribe"))?;
    pubsub
        .subscribe(format!("player:{player_id}:events"))
        .await
        .map_err(|_| actix_web::error::ErrorInternalServerError("redis subscribe"))?;
    pubsub
        .subscribe("lobby:events")
        .await
        .map_err(|_| actix_web::error::ErrorInternalServerError("redis subscribe"))?;

    let db = db_pool.get_ref().clone();
    let redis_client = redis.get_ref().clone();

    actix::spawn(async move {
        let mut redis_stream = pubsub.on_message();

        loop {
            tokio::select! {
                // client → server
                Some(frame) = ws_stream.next() => {
                    match frame {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(cmsg) => {
                                    if let Err(e) = dispatch(db.clone(), redis_client.clone(), player_id, cmsg).await {
                                        log::warn!("dispatch error for {player_id}: {e:?}");
                                        let err = ServerMsg::Error {
                                            message: "Server busy, please retry.".into(),
                                        };
                                        if let Ok(json) = serde_json::to_string(&err) {
                                            let _ = session.text(json).await;
                                        }
                                    }
                                }
                                Err(e) => {
                                    // Malformed payloads never reach the engine.
                                    let err = ServerMsg::Error {
                                        message: format!("Unrecognized message: {e}"),
                                    };
                                    if let Ok(json) = serde_json::to_string(&err) {
                                        let _ = session.text(json).await;
                                    }
                                }
                            }
                        }
                        Ok(Message::Close(_)) | Err(_) => break,
                        _ => {}
                    }
                }
                // redis → client
                Some(msg) = redis_stream.next() => {
                    if let Ok(json) = msg.get_payload::<String>() {
                        if let Err(e) = session.text(json).await {
                            log::warn!("WS send failed for {player_id}: {e:?}");
                            break;
                        }
                    }
                }
                else => break,
            }
        }

        // Presence lifecycle is tied to the socket, nothing else: a dropped
        // connection is not a LeaveGame, the player's matchup keeps waiting.
        if let Ok(mut conn) = redis_client.get_multiplexed_async_connection().await {
            let _: () = conn.del(format!("session:{player_id}")).await.unwrap_or(());
        }
        log::info!("WS closed for player {player_id}");
    });

    Ok(response)
}
