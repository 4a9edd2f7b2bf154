//! Bracket geometry tests: tree shape, feeder pairing and validation.

use bracket_royale_server::game::bracket::{
    create_bracket, feeder_target, matchups_in_round, total_rounds, SUPPORTED_SIZES,
};

#[test]
fn bracket_has_n_minus_one_matchups_across_log2_rounds() {
    for &n in &SUPPORTED_SIZES {
        let seeds = create_bracket(n).expect("supported size");
        assert_eq!(seeds.len() as i32, n - 1, "N={n} should yield N-1 matchups");

        let rounds = total_rounds(n);
        for r in 1..=rounds {
            let in_round = seeds.iter().filter(|s| s.round == r).count() as i32;
            assert_eq!(in_round, n >> r, "N={n} round {r}");
            assert_eq!(in_round, matchups_in_round(n, r));
        }
        // No matchups beyond the final round.
        assert!(seeds.iter().all(|s| (1..=rounds).contains(&s.round)));
    }
}

#[test]
fn round_one_comes_first_in_slot_order() {
    let seeds = create_bracket(8).unwrap();
    let round1: Vec<i32> = seeds
        .iter()
        .filter(|s| s.round == 1)
        .map(|s| s.slot_index)
        .collect();
    assert_eq!(round1, vec![0, 1, 2, 3]);
}

#[test]
fn unsupported_sizes_are_rejected() {
    for n in [0, 1, 3, 5, 6, 7, 12, 128, -4] {
        assert!(create_bracket(n).is_err(), "{n} must be rejected");
    }
}

#[test]
fn sibling_feeders_pair_into_one_target() {
    // Round-r matchups 2k and 2k+1 both feed round-(r+1) matchup k.
    for k in 0..16 {
        assert_eq!(feeder_target(2 * k), k);
        assert_eq!(feeder_target(2 * k + 1), k);
    }
}

#[test]
fn final_round_has_a_single_matchup() {
    for &n in &SUPPORTED_SIZES {
        assert_eq!(matchups_in_round(n, total_rounds(n)), 1);
    }
}
