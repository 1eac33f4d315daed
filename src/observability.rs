use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking proposals accepted.
pub const PROPOSALS_ACCEPTED_TOTAL: &str = "vacancy_proposals_accepted_total";

/// Counter: booking proposals rejected by a conflict.
pub const PROPOSAL_CONFLICTS_TOTAL: &str = "vacancy_proposal_conflicts_total";

/// Counter: bookings cancelled.
pub const CANCELLATIONS_TOTAL: &str = "vacancy_cancellations_total";

/// Counter: manual availability slots created.
pub const SLOTS_CREATED_TOTAL: &str = "vacancy_slots_created_total";

/// Counter: calendar projections served.
pub const PROJECTIONS_TOTAL: &str = "vacancy_projections_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: bookings currently held in the store (any status).
pub const BOOKINGS_LIVE: &str = "vacancy_bookings_live";

/// Gauge: availability slots currently held in the store.
pub const SLOTS_LIVE: &str = "vacancy_slots_live";

/// Histogram: WAL flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "vacancy_wal_flush_duration_seconds";

/// Counter: listing-directory cache hits.
pub const DIRECTORY_CACHE_HITS_TOTAL: &str = "vacancy_directory_cache_hits_total";

/// Counter: listing-directory cache misses.
pub const DIRECTORY_CACHE_MISSES_TOTAL: &str = "vacancy_directory_cache_misses_total";

/// Install a Prometheus metrics exporter on the given port. No-op if `None`.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Install the default fmt tracing subscriber. Embedders with their own
/// subscriber skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}
