//! Deterministic matchup resolution over the cyclic move set.

use crate::game::types::{Move, Slot};

/// The move this move defeats.
pub fn beats(mv: Move) -> Move {
    match mv {
        Move::Rock => Move::Scissors,
        Move::Paper => Move::Rock,
        Move::Scissors => Move::Paper,
    }
}

/// Decide a matchup from both submitted moves. `None` means a tie: the
/// matchup stays unresolved and both players must submit fresh moves — no
/// randomness is ever involved, so replays of the log are auditable.
pub fn resolve(p1: Move, p2: Move) -> Option<Slot> {
    if p1 == p2 {
        None
    } else if beats(p1) == p2 {
        Some(Slot::P1)
    } else {
        Some(Slot::P2)
    }
}
