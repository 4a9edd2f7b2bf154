//! Prometheus metrics & middleware helper.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{opts, IntCounterVec};

/// Global Prometheus handle reused in tests.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("bracket_royale")
        .endpoint("/metrics") // exposed URL
        .build()
        .expect("metrics builder")
});

/// Inbound game events by type, counted at dispatch before any routing.
pub static GAME_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!("bracket_royale_game_events_total", "Inbound game events"),
        &["event"],
    )
    .expect("game events counter");
    METRICS
        .registry
        .register(Box::new(counter.clone()))
        .expect("register game events counter");
    counter
});
