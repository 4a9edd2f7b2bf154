//! Runtime configuration for the Bracket Royale server.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// Fraction of the prize pool retained before distribution.
    pub commission_rate: f64,
    /// Bounty share per final rank; ranks absent here pay zero.
    pub bounty_distribution: BTreeMap<u32, f64>,
    /// Redis presence-key TTL (seconds).
    pub presence_ttl: u64,
    /// Seconds a game actor may sit idle before shutting down.
    pub session_idle: u64,
}

impl Settings {
    fn from_env() -> Self {
        let commission_rate = env::var("COMMISSION_RATE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|r| (0.0..=1.0).contains(r))
            .unwrap_or(0.05);

        let bounty_distribution = env::var("BOUNTY_DISTRIBUTION")
            .ok()
            .and_then(|v| parse_distribution(&v))
            .unwrap_or_else(default_distribution);

        let presence_ttl = env::var("PRESENCE_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let session_idle = env::var("SESSION_IDLE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1800); // 30 min default

        Settings {
            commission_rate,
            bounty_distribution,
            presence_ttl,
            session_idle,
        }
    }
}

/// Parse `"1:0.5,2:0.3,3:0.2"` into a rank → fraction map.
fn parse_distribution(raw: &str) -> Option<BTreeMap<u32, f64>> {
    let mut map = BTreeMap::new();
    for pair in raw.split(',') {
        let (rank, share) = pair.split_once(':')?;
        map.insert(
            rank.trim().parse::<u32>().ok()?,
            share.trim().parse::<f64>().ok()?,
        );
    }
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn default_distribution() -> BTreeMap<u32, f64> {
    BTreeMap::from([(1, 0.5), (2, 0.3), (3, 0.2)])
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_parses_rank_share_pairs() {
        let map = parse_distribution("1:0.6, 2:0.4").unwrap();
        assert_eq!(map.get(&1), Some(&0.6));
        assert_eq!(map.get(&2), Some(&0.4));
    }

    #[test]
    fn malformed_distribution_is_rejected() {
        assert!(parse_distribution("1=0.6").is_none());
        assert!(parse_distribution("").is_none());
    }
}
