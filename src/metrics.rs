// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics collection for the product edge service.
//!
//! Tracks the outcome and latency of upstream product lookups.

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};
use std::sync::Arc;

use crate::error::AppError;

/// Outcome label values for `comline_api_calls_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Metrics collector, created once at startup and handed to the services that record.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,

    // Upstream lookup metrics
    pub api_calls: IntCounterVec,
    pub lookup_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let api_calls = IntCounterVec::new(
            Opts::new(
                "comline_api_calls_total",
                "Number of ComLine product lookups by result",
            ),
            &["result"],
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;

        let lookup_duration = Histogram::with_opts(
            HistogramOpts::new(
                "comline_api_get_product_duration_seconds",
                "Time taken to fetch a product by identifier from the ComLine API",
            )
            .buckets(vec![
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;

        registry
            .register(Box::new(api_calls.clone()))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;
        registry
            .register(Box::new(lookup_duration.clone()))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;

        // Both series exist from the start so dashboards see zeros instead of gaps.
        for outcome in [Outcome::Success, Outcome::Failure] {
            api_calls.with_label_values(&[outcome.as_str()]);
        }

        Ok(Self {
            registry: Arc::new(registry),
            api_calls,
            lookup_duration,
        })
    }

    /// Record the terminal outcome of one lookup
    pub fn record_lookup(&self, outcome: Outcome, seconds: f64) {
        self.api_calls.with_label_values(&[outcome.as_str()]).inc();
        self.lookup_duration.observe(seconds);
    }

    /// Current value of the lookup counter for one outcome
    pub fn lookup_count(&self, outcome: Outcome) -> u64 {
        self.api_calls.with_label_values(&[outcome.as_str()]).get()
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String, AppError> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

        String::from_utf8(buffer).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to convert metrics to string: {}",
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_outcomes_separately() {
        let metrics = Metrics::new().unwrap();

        metrics.record_lookup(Outcome::Success, 0.02);
        metrics.record_lookup(Outcome::Failure, 0.5);
        metrics.record_lookup(Outcome::Failure, 0.1);

        assert_eq!(metrics.lookup_count(Outcome::Success), 1);
        assert_eq!(metrics.lookup_count(Outcome::Failure), 2);
        assert_eq!(metrics.lookup_duration.get_sample_count(), 3);
    }

    #[test]
    fn export_lists_both_series() {
        let metrics = Metrics::new().unwrap();
        metrics.record_lookup(Outcome::Success, 0.01);

        let text = metrics.export().unwrap();

        assert!(text.contains(r#"comline_api_calls_total{result="success"} 1"#));
        assert!(text.contains(r#"comline_api_calls_total{result="failure"} 0"#));
        assert!(text.contains("comline_api_get_product_duration_seconds_count 1"));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = Metrics::new().unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let metrics = metrics.clone();
                scope.spawn(move || {
                    for _ in 0..1_000 {
                        metrics.record_lookup(Outcome::Failure, 0.001);
                    }
                });
            }
        });

        assert_eq!(metrics.lookup_count(Outcome::Failure), 8_000);
    }
}
