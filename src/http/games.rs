//! Read-only game queries for lobby browsing and reconnecting clients.

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Game, Matchup};
use crate::db::{game_repo, matchup_repo};

/// GET /api/games/open — every joinable game with its headcount.
#[get("/games/open")]
pub async fn open(db: web::Data<PgPool>) -> impl Responder {
    match game_repo::open_games(&**db).await {
        Ok(games) => HttpResponse::Ok().json(games),
        Err(e) => {
            log::error!("open-games query failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[derive(Serialize)]
struct BracketView {
    game: Game,
    matchups: Vec<Matchup>,
}

/// GET /api/games/{game_id}/bracket — full bracket snapshot, used by
/// clients re-opening a socket mid-tournament.
#[get("/games/{game_id}/bracket")]
pub async fn bracket(path: web::Path<Uuid>, db: web::Data<PgPool>) -> impl Responder {
    let game_id = path.into_inner();
    let game = match game_repo::find(&**db, game_id).await {
        Ok(g) => g,
        Err(crate::errors::EngineError::NotFound(_)) => {
            return HttpResponse::NotFound().finish();
        }
        Err(e) => {
            log::error!("bracket query failed for {game_id}: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    match matchup_repo::by_game(&**db, game_id).await {
        Ok(matchups) => HttpResponse::Ok().json(BracketView { game, matchups }),
        Err(e) => {
            log::error!("bracket query failed for {game_id}: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(open).service(bracket);
}
