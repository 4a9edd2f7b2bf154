//! Rank-band and bounty-split tests, including the worked 4-player example.

use std::collections::BTreeMap;

use bracket_royale_server::game::payout::{compute_payouts, payout_for_rank};
use bracket_royale_server::game::rank::{rank_on_elimination, CHAMPION_RANK};

fn standard_distribution() -> BTreeMap<u32, f64> {
    BTreeMap::from([(1, 0.5), (2, 0.3), (3, 0.2)])
}

#[test]
fn four_player_rank_bands() {
    // Round-1 losers are tied at rank 3; the final loser is rank 2.
    assert_eq!(rank_on_elimination(4, 1), 3);
    assert_eq!(rank_on_elimination(4, 2), 2);
    assert_eq!(CHAMPION_RANK, 1);
}

#[test]
fn larger_bracket_rank_bands() {
    // N=8: quarter-final losers tie at 5, semi-final losers at 3.
    assert_eq!(rank_on_elimination(8, 1), 5);
    assert_eq!(rank_on_elimination(8, 2), 3);
    assert_eq!(rank_on_elimination(8, 3), 2);

    // N=64 first-round exits share rank 33.
    assert_eq!(rank_on_elimination(64, 1), 33);
}

#[test]
fn worked_four_player_example() {
    // buy_in 5 × 4 players = 20; 5% commission leaves 19.
    let payouts = compute_payouts(20.0, 0.05, &standard_distribution());
    assert_eq!(payout_for_rank(&payouts, 1), 9.50);
    assert_eq!(payout_for_rank(&payouts, 2), 5.70);
    assert_eq!(payout_for_rank(&payouts, 3), 3.80);
}

#[test]
fn unconfigured_ranks_pay_nothing() {
    let payouts = compute_payouts(20.0, 0.05, &standard_distribution());
    assert_eq!(payout_for_rank(&payouts, 4), 0.0);
    assert_eq!(payout_for_rank(&payouts, 33), 0.0);
}

#[test]
fn fractions_need_not_sum_to_one() {
    let dist = BTreeMap::from([(1, 0.25)]);
    let payouts = compute_payouts(100.0, 0.0, &dist);
    assert_eq!(payout_for_rank(&payouts, 1), 25.0);
    assert_eq!(payouts.len(), 1);
}

#[test]
fn amounts_are_rounded_to_cents() {
    let dist = BTreeMap::from([(1, 1.0 / 3.0)]);
    let payouts = compute_payouts(10.0, 0.0, &dist);
    assert_eq!(payout_for_rank(&payouts, 1), 3.33);
}

#[test]
fn zero_buy_in_pays_zero_everywhere() {
    let payouts = compute_payouts(0.0, 0.05, &standard_distribution());
    for rank in 1..=3 {
        assert_eq!(payout_for_rank(&payouts, rank), 0.0);
    }
}
