use serde::{Deserialize, Serialize};

/// The three-way cyclic move set. Each move beats exactly one other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "move_type", rename_all = "UPPERCASE")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

/// One of the two player positions within a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    P1,
    P2,
}

/// Tournament life-cycle. CLOSED is terminal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "game_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Open,
    InProgress,
    Closed,
}
