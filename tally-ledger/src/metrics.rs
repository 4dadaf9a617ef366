//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `ledger_users_registered_total` - Total successful registrations
//! - `ledger_deposits_total` - Total successful deposits
//! - `ledger_transfers_total` - Total successful transfers
//! - `ledger_redemptions_total` - Total successful point redemptions
//! - `ledger_operation_failures_total` - Total rejected operations
//! - `ledger_operation_duration_seconds` - Histogram of operation latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns its registry so multiple ledger instances can coexist
/// in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Total successful registrations
    pub users_registered: IntCounter,

    /// Total successful deposits
    pub deposits: IntCounter,

    /// Total successful transfers
    pub transfers: IntCounter,

    /// Total successful redemptions
    pub redemptions: IntCounter,

    /// Total rejected operations
    pub operation_failures: IntCounter,

    /// Operation duration histogram
    pub operation_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let users_registered = IntCounter::new(
            "ledger_users_registered_total",
            "Total successful registrations",
        )?;
        registry.register(Box::new(users_registered.clone()))?;

        let deposits = IntCounter::new("ledger_deposits_total", "Total successful deposits")?;
        registry.register(Box::new(deposits.clone()))?;

        let transfers = IntCounter::new("ledger_transfers_total", "Total successful transfers")?;
        registry.register(Box::new(transfers.clone()))?;

        let redemptions = IntCounter::new(
            "ledger_redemptions_total",
            "Total successful point redemptions",
        )?;
        registry.register(Box::new(redemptions.clone()))?;

        let operation_failures = IntCounter::new(
            "ledger_operation_failures_total",
            "Total rejected operations",
        )?;
        registry.register(Box::new(operation_failures.clone()))?;

        let operation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_operation_duration_seconds",
                "Histogram of operation latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100]),
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            users_registered,
            deposits,
            transfers,
            redemptions,
            operation_failures,
            operation_duration,
            registry,
        })
    }

    /// Record a rejected operation
    pub fn record_failure(&self) {
        self.operation_failures.inc();
    }

    /// Record operation duration
    pub fn record_duration(&self, duration_seconds: f64) {
        self.operation_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
