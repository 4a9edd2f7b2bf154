//! Pure, config-driven bounty split. Crediting balances is the wallet
//! collaborator's job, never done here.

use std::collections::BTreeMap;

/// Round to 2 decimal places for display.
fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Split `total_pool` by rank: commission comes off the top, then each rank
/// listed in `bounty_distribution` gets its fraction of the remainder.
/// Fractions need not sum to 1; unlisted ranks pay nothing.
pub fn compute_payouts(
    total_pool: f64,
    commission_rate: f64,
    bounty_distribution: &BTreeMap<u32, f64>,
) -> BTreeMap<u32, f64> {
    let commission = total_pool * commission_rate;
    let remaining_pool = total_pool - commission;

    bounty_distribution
        .iter()
        .map(|(&rank, &share)| (rank, round_cents(remaining_pool * share)))
        .collect()
}

/// Amount owed to `rank`, zero when no share is configured.
pub fn payout_for_rank(payouts: &BTreeMap<u32, f64>, rank: u32) -> f64 {
    payouts.get(&rank).copied().unwrap_or(0.0)
}
