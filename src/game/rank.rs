//! Final-rank computation from elimination round.

/// The sole winner of the final round.
pub const CHAMPION_RANK: u32 = 1;

/// Rank awarded to a player eliminated in `round` of a tournament with
/// `max_players` entrants: one past the number of survivors of that round.
/// All players eliminated in the same round are tied at this rank.
pub fn rank_on_elimination(max_players: u32, round: u32) -> u32 {
    (max_players >> round) + 1
}
