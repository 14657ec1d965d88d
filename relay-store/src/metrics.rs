//! Prometheus metrics for the store server.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub struct StoreMetrics {
    /// Status events applied, by merge outcome.
    pub events_ingested_total: IntCounterVec,
    /// Events dropped without retry, by error code.
    pub events_rejected_total: IntCounterVec,
    /// Events returned to the stream after a persistence failure.
    pub events_redelivered_total: IntCounter,
    /// Ingest duration in seconds.
    pub ingest_duration_seconds: Histogram,
}

impl StoreMetrics {
    pub fn new() -> Self {
        let events_ingested_total = IntCounterVec::new(
            Opts::new(
                "events_ingested_total",
                "Status events applied to the log, by merge outcome",
            ),
            &["outcome"],
        )
        .expect("Failed to create events_ingested_total metric");

        let events_rejected_total = IntCounterVec::new(
            Opts::new(
                "events_rejected_total",
                "Events dropped without retry, by error code",
            ),
            &["code"],
        )
        .expect("Failed to create events_rejected_total metric");

        let events_redelivered_total = IntCounter::new(
            "events_redelivered_total",
            "Events returned to the stream after a persistence failure",
        )
        .expect("Failed to create events_redelivered_total metric");

        let ingest_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("ingest_duration_seconds", "Ingest duration in seconds")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )
        .expect("Failed to create ingest_duration_seconds metric");

        Self {
            events_ingested_total,
            events_rejected_total,
            events_redelivered_total,
            ingest_duration_seconds,
        }
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.events_ingested_total.clone()))?;
        registry.register(Box::new(self.events_rejected_total.clone()))?;
        registry.register(Box::new(self.events_redelivered_total.clone()))?;
        registry.register(Box::new(self.ingest_duration_seconds.clone()))?;
        Ok(())
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}
