//! Pure bracket geometry: building the empty matchup tree and locating
//! positions within it. All persistence happens in the repositories.

use crate::errors::{EngineError, EngineResult};

/// Player counts a bracket may be created with.
pub const SUPPORTED_SIZES: [i32; 6] = [2, 4, 8, 16, 32, 64];

/// Position of one matchup inside the tree, before any slots are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchupSeed {
    pub round: i32,
    pub slot_index: i32,
}

/// Number of rounds a bracket of `max_players` runs (log2).
pub fn total_rounds(max_players: i32) -> i32 {
    max_players.trailing_zeros() as i32
}

/// Matchups in round `r`: N/2^r.
pub fn matchups_in_round(max_players: i32, round: i32) -> i32 {
    max_players >> round
}

/// The round-`r+1` matchup fed by round-`r` matchup `slot_index`.
/// Siblings 2k and 2k+1 both feed matchup k.
pub fn feeder_target(slot_index: i32) -> i32 {
    slot_index / 2
}

/// Generate the full set of empty matchups for a tournament of
/// `max_players`. Round 1 holds N/2 matchups joined directly by players;
/// later rounds are filled only by propagated winners.
pub fn create_bracket(max_players: i32) -> EngineResult<Vec<MatchupSeed>> {
    if !SUPPORTED_SIZES.contains(&max_players) {
        return Err(EngineError::validation(format!(
            "max_players must be one of {SUPPORTED_SIZES:?}, got {max_players}"
        )));
    }

    let rounds = total_rounds(max_players);
    let mut seeds = Vec::with_capacity((max_players - 1) as usize);
    for round in 1..=rounds {
        for slot_index in 0..matchups_in_round(max_players, round) {
            seeds.push(MatchupSeed { round, slot_index });
        }
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_matchups_share_a_target() {
        assert_eq!(feeder_target(0), 0);
        assert_eq!(feeder_target(1), 0);
        assert_eq!(feeder_target(6), 3);
        assert_eq!(feeder_target(7), 3);
    }

    #[test]
    fn rounds_follow_log2() {
        assert_eq!(total_rounds(2), 1);
        assert_eq!(total_rounds(64), 6);
    }
}
