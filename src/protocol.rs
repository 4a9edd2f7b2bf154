//! Wire-protocol shared by client, WS handler and game actors. One tagged
//! variant per event; anything that fails to parse never reaches the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::db::game_repo::OpenGame;
use crate::db::models::Matchup;
use crate::game::types::Move;

// ---------- client → server ----------
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum ClientMsg {
    CreateGame {
        buy_in: Option<f64>,
        max_players: i32,
        game_type: String,
    },
    JoinGame {
        game_id: Uuid,
    },
    StartGame {
        game_id: Uuid,
    },
    SubmitMove {
        game_id: Uuid,
        round: i32,
        #[serde(rename = "move")]
        mv: Move,
    },
    LeaveGame {
        game_id: Uuid,
    },
    /// Opaque relay; broadcast-only, never game-authoritative.
    UpdateGameState {
        game_id: Uuid,
        state: Value,
    },
    FetchOpenGames,
}

impl ClientMsg {
    /// The game a message targets; None for lobby-level requests.
    pub fn game_id(&self) -> Option<Uuid> {
        match self {
            ClientMsg::JoinGame { game_id }
            | ClientMsg::StartGame { game_id }
            | ClientMsg::SubmitMove { game_id, .. }
            | ClientMsg::LeaveGame { game_id }
            | ClientMsg::UpdateGameState { game_id, .. } => Some(*game_id),
            ClientMsg::CreateGame { .. } | ClientMsg::FetchOpenGames => None,
        }
    }

    /// Stable event name, used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            ClientMsg::CreateGame { .. } => "CreateGame",
            ClientMsg::JoinGame { .. } => "JoinGame",
            ClientMsg::StartGame { .. } => "StartGame",
            ClientMsg::SubmitMove { .. } => "SubmitMove",
            ClientMsg::LeaveGame { .. } => "LeaveGame",
            ClientMsg::UpdateGameState { .. } => "UpdateGameState",
            ClientMsg::FetchOpenGames => "FetchOpenGames",
        }
    }
}

/// One line of the final payout report.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BountyResult {
    pub player_id: Uuid,
    pub rank: u32,
    /// Display amount, already rounded to cents ("9.50").
    pub payout: String,
}

// ---------- server → client ----------
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum ServerMsg {
    GameCreated {
        game: OpenGame,
    },
    PlayerJoined {
        game_id: Uuid,
        player_id: Uuid,
    },
    GameStarted {
        game_id: Uuid,
        bracket: Vec<Matchup>,
        current_round: i32,
    },
    MoveSubmitted {
        game_id: Uuid,
        player_id: Uuid,
        round: i32,
    },
    /// winner/loser are both None when the matchup tied and stays open.
    MatchupResult {
        game_id: Uuid,
        round: i32,
        winner_id: Option<Uuid>,
        loser_id: Option<Uuid>,
    },
    PlayerEliminated {
        game_id: Uuid,
        player_id: Uuid,
        rank: u32,
        payout: String,
    },
    RoundComplete {
        game_id: Uuid,
        next_round: i32,
    },
    GameEnded {
        game_id: Uuid,
        winner_id: Uuid,
        bounty_results: Vec<BountyResult>,
    },
    PlayerLeft {
        game_id: Uuid,
        player_id: Uuid,
    },
    GameStateUpdated {
        game_id: Uuid,
        state: Value,
    },
    OpenGames {
        games: Vec<OpenGame>,
    },
    Error {
        message: String,
    },
}
