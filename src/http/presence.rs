//! Presence queries backed by the WS layer's Redis session keys. This is
//! the only way the engine side observes connectivity; nothing here mutates
//! transport state.

use actix_web::{get, web, HttpResponse, Responder};
use redis::{AsyncCommands, Client as RedisClient};
use sqlx::PgPool;
use uuid::Uuid;

/// GET /api/presence/online/{player_id}
#[get("/presence/online/{player_id}")]
pub async fn online(path: web::Path<Uuid>, redis: web::Data<RedisClient>) -> impl Responder {
    let pid = path.into_inner();
    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(_) => return HttpResponse::InternalServerError().body("redis down"),
    };

    let online: Result<bool, _> = conn.exists(format!("session:{pid}")).await;
    match online {
        Ok(v) => HttpResponse::Ok().json(serde_json::json!({ "online": v })),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

/// GET /api/presence/in-game/{player_id} — the games a player is still
/// alive in (OPEN or IN_PROGRESS), i.e. "is player X in room Y".
#[get("/presence/in-game/{player_id}")]
pub async fn in_game(path: web::Path<Uuid>, db: web::Data<PgPool>) -> impl Responder {
    let pid = path.into_inner();
    let rows: Result<Vec<Uuid>, sqlx::Error> = sqlx::query_scalar(
        r#"SELECT g.id FROM games g
           JOIN game_participants p ON p.game_id = g.id
           WHERE p.player_id = $1 AND NOT p.eliminated AND g.status <> 'CLOSED'"#,
    )
    .bind(pid)
    .fetch_all(&**db)
    .await;

    match rows {
        Ok(game_ids) => HttpResponse::Ok().json(serde_json::json!({ "games": game_ids })),
        Err(e) => {
            log::error!("in-game query failed for {pid}: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(online).service(in_game);
}
