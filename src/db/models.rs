use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::game::types::{GameStatus, Move, Slot};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: Uuid,
    pub buy_in: f64,
    pub max_players: i32,
    pub game_type: String,
    pub status: GameStatus,
    /// 1-based, meaningful only while IN_PROGRESS (0 before start).
    pub current_round: i32,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Buy-ins collected from a full roster.
    pub fn total_pool(&self) -> f64 {
        self.buy_in * self.max_players as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GameParticipant {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub eliminated: bool,
    pub joined_at: DateTime<Utc>,
}

/// One node of the bracket tree, addressed by (game, round, slot_index).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Matchup {
    pub id: Uuid,
    pub game_id: Uuid,
    pub round: i32,
    pub slot_index: i32,
    pub player1_id: Option<Uuid>,
    pub player2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
}

impl Matchup {
    pub fn slot_of(&self, player_id: Uuid) -> Option<Slot> {
        if self.player1_id == Some(player_id) {
            Some(Slot::P1)
        } else if self.player2_id == Some(player_id) {
            Some(Slot::P2)
        } else {
            None
        }
    }

    pub fn player_in(&self, slot: Slot) -> Option<Uuid> {
        match slot {
            Slot::P1 => self.player1_id,
            Slot::P2 => self.player2_id,
        }
    }

    pub fn opponent_of(&self, player_id: Uuid) -> Option<Uuid> {
        match self.slot_of(player_id)? {
            Slot::P1 => self.player2_id,
            Slot::P2 => self.player1_id,
        }
    }

    /// The player who lost this matchup, once a winner is recorded.
    pub fn loser(&self) -> Option<Uuid> {
        let winner = self.winner_id?;
        self.opponent_of(winner)
    }
}

/// Append-only move log entry. `superseded` flips to true only when a tied
/// pair is voided so both players can resubmit for the same round.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoveRecord {
    pub id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub round: i32,
    #[sqlx(rename = "move")]
    #[serde(rename = "move")]
    pub mv: Move,
    pub superseded: bool,
    pub submitted_at: DateTime<Utc>,
}
