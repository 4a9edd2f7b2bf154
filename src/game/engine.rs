//! One handler per inbound event. Each handler treats its event as an
//! isolated transaction against the game's persisted state and returns the
//! outbound messages to publish; the game actor (session.rs) serializes
//! calls per game and does the actual publishing.

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings;
use crate::db::models::{Game, GameParticipant};
use crate::db::{game_repo, matchup_repo, move_repo, participant_repo};
use crate::errors::{EngineError, EngineResult};
use crate::game::{bracket, payout, rank, resolver};
use crate::game::types::{GameStatus, Move, Slot};
use crate::protocol::{BountyResult, ServerMsg};

/// Who an outbound message goes to.
#[derive(Debug, Clone, Copy)]
pub enum Audience {
    /// Every connected client (lobby channel).
    Lobby,
    /// Every participant of the game.
    Game(Uuid),
    /// One player's private channel.
    Player(Uuid),
}

#[derive(Debug)]
pub struct Outbound {
    pub to: Audience,
    pub msg: ServerMsg,
}

impl Outbound {
    fn lobby(msg: ServerMsg) -> Self {
        Outbound { to: Audience::Lobby, msg }
    }
    fn room(game_id: Uuid, msg: ServerMsg) -> Self {
        Outbound { to: Audience::Game(game_id), msg }
    }
    fn player(player_id: Uuid, msg: ServerMsg) -> Self {
        Outbound { to: Audience::Player(player_id), msg }
    }
}

/// Validate, build the empty bracket, persist it atomically with the game
/// row and auto-join the creator.
pub async fn create_game(
    db: &PgPool,
    player_id: Uuid,
    buy_in: Option<f64>,
    max_players: i32,
    game_type: String,
) -> EngineResult<Vec<Outbound>> {
    let buy_in = buy_in.unwrap_or(0.0);
    if buy_in < 0.0 {
        return Err(EngineError::validation("buy_in must be non-negative"));
    }
    if game_type.trim().is_empty() {
        return Err(EngineError::validation("Game type is required."));
    }
    let seeds = bracket::create_bracket(max_players)?;

    let game = game_repo::create(db, buy_in, max_players, &game_type, player_id, &seeds).await?;
    log::info!("game {} created by {player_id} ({max_players} players)", game.id);

    let announced = game_repo::OpenGame {
        game,
        player_count: 1,
    };
    Ok(vec![Outbound::lobby(ServerMsg::GameCreated { game: announced })])
}

/// Claim the first open round-1 slot. Idempotent per player; a leaver
/// re-joining a still-OPEN game gets their eliminated flag cleared.
pub async fn join_game(db: &PgPool, player_id: Uuid, game_id: Uuid) -> EngineResult<Vec<Outbound>> {
    let game = game_repo::find(db, game_id).await?;
    if game.status != GameStatus::Open {
        return Err(EngineError::conflict("The game is no longer open to join."));
    }

    let mut tx = db.begin().await?;

    let already_seated = matchup_repo::find_for_player(&mut *tx, game_id, 1, player_id)
        .await?
        .is_some();
    if !already_seated {
        let round1 = matchup_repo::by_round(&mut *tx, game_id, 1).await?;
        let mut claimed = None;
        for m in &round1 {
            if let Some(slot) = matchup_repo::claim_slot(&mut tx, m.id, player_id).await? {
                claimed = Some((m.slot_index, slot));
                break;
            }
        }
        if claimed.is_none() {
            // Transaction drops here, rolling back nothing of consequence.
            return Err(EngineError::conflict("The game is already full."));
        }
    }
    participant_repo::upsert_join(&mut *tx, game_id, player_id).await?;
    tx.commit().await?;

    log::info!("player {player_id} joined game {game_id}");
    Ok(vec![Outbound::room(
        game_id,
        ServerMsg::PlayerJoined { game_id, player_id },
    )])
}

/// OPEN → IN_PROGRESS once the roster is full; broadcasts the bracket.
pub async fn start_game(db: &PgPool, player_id: Uuid, game_id: Uuid) -> EngineResult<Vec<Outbound>> {
    let game = game_repo::find(db, game_id).await?;
    if game.status != GameStatus::Open {
        return Err(EngineError::conflict("The game has already started."));
    }
    let count = participant_repo::count(db, game_id).await?;
    if count != game.max_players as i64 {
        return Err(EngineError::conflict(format!(
            "The game needs {} players to start, has {count}.",
            game.max_players
        )));
    }
    if !game_repo::start(db, game_id).await? {
        return Err(EngineError::conflict("The game has already started."));
    }

    let bracket = matchup_repo::by_game(db, game_id).await?;
    log::info!("game {game_id} started by {player_id} with {count} players");
    Ok(vec![Outbound::room(
        game_id,
        ServerMsg::GameStarted {
            game_id,
            bracket,
            current_round: 1,
        },
    )])
}

/// Log a move; once both slot-holders of the caller's matchup have live
/// moves, resolve it and advance the bracket. Everything after the guards
/// runs in one transaction so a storage failure rolls the whole step back.
pub async fn submit_move(
    db: &PgPool,
    player_id: Uuid,
    game_id: Uuid,
    round: i32,
    mv: Move,
) -> EngineResult<Vec<Outbound>> {
    let game = game_repo::find(db, game_id).await?;
    if game.status != GameStatus::InProgress {
        return Err(EngineError::conflict(
            "The game has not started or is already finished.",
        ));
    }
    if round != game.current_round {
        return Err(EngineError::validation(format!(
            "Round {round} is not the current round ({}).",
            game.current_round
        )));
    }

    let mut tx = db.begin().await?;

    // Eliminated players (including voluntary leavers) are out of the
    // running even though their old bracket slot survives.
    ensure_active(participant_repo::find(&mut *tx, game_id, player_id).await?)?;

    let matchup = matchup_repo::find_for_player(&mut *tx, game_id, round, player_id)
        .await?
        .ok_or_else(|| {
            EngineError::conflict("You are not in an active matchup for this round.")
        })?;
    if matchup.winner_id.is_some() {
        return Err(EngineError::conflict("Your matchup is already resolved."));
    }

    let record = move_repo::insert(&mut *tx, game_id, player_id, round, mv).await?;

    let mut out = vec![Outbound::room(
        game_id,
        ServerMsg::MoveSubmitted {
            game_id,
            player_id,
            round,
        },
    )];

    // Resolve only when the opponent slot is filled and has a live move.
    let opponent = matchup.opponent_of(player_id);
    let opp_record = match opponent {
        Some(opp) => move_repo::active_move(&mut *tx, game_id, opp, round).await?,
        None => None,
    };

    if let Some(opp_record) = opp_record {
        let caller_slot = matchup
            .slot_of(player_id)
            .ok_or_else(|| EngineError::conflict("You do not hold a slot in this matchup."))?;
        let (m1, m2) = match caller_slot {
            Slot::P1 => (record.mv, opp_record.mv),
            Slot::P2 => (opp_record.mv, record.mv),
        };

        match resolver::resolve(m1, m2) {
            None => {
                // Tie: void both records so the pair can resubmit; the
                // matchup stays unresolved and the round keeps waiting.
                move_repo::supersede(&mut *tx, &[record.id, opp_record.id]).await?;
                out.push(Outbound::room(
                    game_id,
                    ServerMsg::MatchupResult {
                        game_id,
                        round,
                        winner_id: None,
                        loser_id: None,
                    },
                ));
                log::debug!("tie in game {game_id} round {round}, both resubmit");
            }
            Some(winning_slot) => {
                let winner_id = matchup
                    .player_in(winning_slot)
                    .ok_or_else(|| EngineError::conflict("Matchup slot is empty."))?;
                let advanced =
                    advance_bracket(&mut tx, &game, &matchup, winner_id, round).await?;
                out.extend(advanced);
            }
        }
    }

    tx.commit().await?;
    Ok(out)
}

/// Only live participants may act on a running game.
fn ensure_active(participant: Option<GameParticipant>) -> EngineResult<()> {
    match participant {
        Some(p) if !p.eliminated => Ok(()),
        _ => Err(EngineError::conflict(
            "You are not an active participant in this game.",
        )),
    }
}

/// Record a decided matchup and ripple its consequences: eliminate the
/// loser, propagate the winner, and complete the round or the game.
async fn advance_bracket(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    game: &Game,
    matchup: &crate::db::models::Matchup,
    winner_id: Uuid,
    round: i32,
) -> EngineResult<Vec<Outbound>> {
    let game_id = game.id;

    if !matchup_repo::set_winner(&mut **tx, matchup.id, winner_id).await? {
        return Err(EngineError::conflict("Matchup was already resolved."));
    }
    let loser_id = matchup
        .opponent_of(winner_id)
        .ok_or_else(|| EngineError::conflict("Matchup has no opponent to eliminate."))?;
    participant_repo::eliminate(&mut **tx, game_id, loser_id).await?;

    let mut out = vec![Outbound::room(
        game_id,
        ServerMsg::MatchupResult {
            game_id,
            round,
            winner_id: Some(winner_id),
            loser_id: Some(loser_id),
        },
    )];

    let cfg = settings();
    let payouts = payout::compute_payouts(
        game.total_pool(),
        cfg.commission_rate,
        &cfg.bounty_distribution,
    );
    let loser_rank = rank::rank_on_elimination(game.max_players as u32, round as u32);
    out.push(Outbound::player(
        loser_id,
        ServerMsg::PlayerEliminated {
            game_id,
            player_id: loser_id,
            rank: loser_rank,
            payout: format!("{:.2}", payout::payout_for_rank(&payouts, loser_rank)),
        },
    ));

    let total_rounds = bracket::total_rounds(game.max_players);
    if round < total_rounds {
        // Winner moves up: sibling matchups 2k/2k+1 feed matchup k.
        let target = matchup_repo::find_at(
            &mut **tx,
            game_id,
            round + 1,
            bracket::feeder_target(matchup.slot_index),
        )
        .await?
        .ok_or_else(|| EngineError::not_found("Next-round matchup missing."))?;
        if matchup_repo::claim_slot(tx, target.id, winner_id).await?.is_none() {
            return Err(EngineError::conflict("Next-round slot already taken."));
        }

        if matchup_repo::unresolved_in_round(&mut **tx, game_id, round).await? == 0
            && game_repo::advance_round(&mut **tx, game_id, round).await?
        {
            out.push(Outbound::room(
                game_id,
                ServerMsg::RoundComplete {
                    game_id,
                    next_round: round + 1,
                },
            ));
            log::info!("game {game_id} advanced to round {}", round + 1);
        }
    } else {
        // Final matchup: close the game and publish the bounty report.
        if !game_repo::close(&mut **tx, game_id, winner_id).await? {
            return Err(EngineError::conflict("The game is already closed."));
        }

        let matchups = matchup_repo::by_game(&mut **tx, game_id).await?;
        let mut bounty_results: Vec<BountyResult> = matchups
            .iter()
            .filter_map(|m| {
                let loser = m.loser()?;
                let r = rank::rank_on_elimination(game.max_players as u32, m.round as u32);
                Some(BountyResult {
                    player_id: loser,
                    rank: r,
                    payout: format!("{:.2}", payout::payout_for_rank(&payouts, r)),
                })
            })
            .collect();
        bounty_results.push(BountyResult {
            player_id: winner_id,
            rank: rank::CHAMPION_RANK,
            payout: format!(
                "{:.2}",
                payout::payout_for_rank(&payouts, rank::CHAMPION_RANK)
            ),
        });

        out.push(Outbound::room(
            game_id,
            ServerMsg::GameEnded {
                game_id,
                winner_id,
                bounty_results,
            },
        ));
        log::info!("game {game_id} ended, winner {winner_id}");
    }

    Ok(out)
}

/// Voluntary exit: the leaver is eliminated but their pending matchup is
/// left untouched and the game stays open or running.
pub async fn leave_game(db: &PgPool, player_id: Uuid, game_id: Uuid) -> EngineResult<Vec<Outbound>> {
    let game = game_repo::find(db, game_id).await?;
    if game.status == GameStatus::Closed {
        return Err(EngineError::conflict("The game is already closed."));
    }
    if !participant_repo::eliminate(db, game_id, player_id).await? {
        return Err(EngineError::conflict(
            "You are not an active participant in this game.",
        ));
    }

    log::info!("player {player_id} left game {game_id}");
    Ok(vec![Outbound::room(
        game_id,
        ServerMsg::PlayerLeft { game_id, player_id },
    )])
}

/// Opaque relay for client-side presentation state; never persisted.
pub async fn update_game_state(
    db: &PgPool,
    _player_id: Uuid,
    game_id: Uuid,
    state: serde_json::Value,
) -> EngineResult<Vec<Outbound>> {
    game_repo::find(db, game_id).await?;
    Ok(vec![Outbound::room(
        game_id,
        ServerMsg::GameStateUpdated { game_id, state },
    )])
}

/// Lobby browsing: every OPEN game with its headcount, to the caller only.
pub async fn fetch_open_games(db: &PgPool, player_id: Uuid) -> EngineResult<Vec<Outbound>> {
    let games = game_repo::open_games(db).await?;
    Ok(vec![Outbound::player(
        player_id,
        ServerMsg::OpenGames { games },
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn participant(eliminated: bool) -> GameParticipant {
        GameParticipant {
            game_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            eliminated,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn live_participants_may_act() {
        assert!(ensure_active(Some(participant(false))).is_ok());
    }

    #[test]
    fn leavers_cannot_keep_playing_their_old_slot() {
        // A voluntary leaver keeps their bracket slot but must be refused
        // further moves once eliminated.
        let err = ensure_active(Some(participant(true))).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn non_participants_are_refused() {
        let err = ensure_active(None).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }
}
