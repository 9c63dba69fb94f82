//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the cohort engine: provider
//! fetch outcomes and latency, and engine operation outcomes.

use crate::error::FetchError;
use crate::types::{Rating, RatingSystem};
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the cohort engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Provider fetch metrics
    provider_metrics: ProviderMetrics,

    /// Engine operation metrics
    engine_metrics: EngineMetrics,
}

/// Provider fetch metrics
#[derive(Clone)]
pub struct ProviderMetrics {
    /// Fetches by system and outcome
    pub fetches_total: IntCounterVec,

    /// Fetch latency by system
    pub fetch_duration_seconds: HistogramVec,
}

/// Engine operation metrics
#[derive(Clone)]
pub struct EngineMetrics {
    /// Rating updates by outcome
    pub updates_total: IntCounterVec,

    /// Cohort autopicks by outcome
    pub autopicks_total: IntCounterVec,

    /// Updates that merged with at least one tolerated provider failure
    pub partial_merges_total: IntCounter,

    /// Time spent building progress reports for a population
    pub report_duration_seconds: Histogram,
}

/// Metric label for a fetch result
pub fn fetch_outcome_label(result: &std::result::Result<Rating, FetchError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(FetchError::NotFound { .. }) => "not_found",
        Err(FetchError::Transient { .. }) => "transient",
        Err(FetchError::Timeout { .. }) => "timeout",
        Err(FetchError::Unsupported { .. }) => "unsupported",
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let provider_metrics = ProviderMetrics::new(&registry)?;
        let engine_metrics = EngineMetrics::new(&registry)?;

        Ok(Self {
            registry,
            provider_metrics,
            engine_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get provider metrics
    pub fn provider(&self) -> &ProviderMetrics {
        &self.provider_metrics
    }

    /// Get engine metrics
    pub fn engine(&self) -> &EngineMetrics {
        &self.engine_metrics
    }

    /// Record one provider fetch
    pub fn record_fetch(&self, system: RatingSystem, outcome: &str, duration: Duration) {
        self.provider_metrics
            .fetches_total
            .with_label_values(&[system.label(), outcome])
            .inc();

        self.provider_metrics
            .fetch_duration_seconds
            .with_label_values(&[system.label()])
            .observe(duration.as_secs_f64());
    }

    /// Record a finished rating update
    pub fn record_update(&self, outcome: &str, tolerated_failures: usize) {
        self.engine_metrics
            .updates_total
            .with_label_values(&[outcome])
            .inc();

        if tolerated_failures > 0 {
            self.engine_metrics.partial_merges_total.inc();
        }
    }

    /// Record a finished cohort autopick
    pub fn record_autopick(&self, outcome: &str) {
        self.engine_metrics
            .autopicks_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record progress report generation time
    pub fn record_report(&self, duration: Duration) {
        self.engine_metrics
            .report_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&metric_families)?)
    }

    /// Start a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::start()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector").finish_non_exhaustive()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ProviderMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let fetches_total = IntCounterVec::new(
            Opts::new(
                "cohort_engine_provider_fetches_total",
                "Total provider rating fetches",
            ),
            &["system", "outcome"],
        )?;
        registry.register(Box::new(fetches_total.clone()))?;

        let fetch_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "cohort_engine_provider_fetch_duration_seconds",
                "Provider rating fetch duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["system"],
        )?;
        registry.register(Box::new(fetch_duration_seconds.clone()))?;

        Ok(Self {
            fetches_total,
            fetch_duration_seconds,
        })
    }
}

impl EngineMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let updates_total = IntCounterVec::new(
            Opts::new("cohort_engine_updates_total", "Total rating updates"),
            &["outcome"],
        )?;
        registry.register(Box::new(updates_total.clone()))?;

        let autopicks_total = IntCounterVec::new(
            Opts::new("cohort_engine_autopicks_total", "Total cohort autopicks"),
            &["outcome"],
        )?;
        registry.register(Box::new(autopicks_total.clone()))?;

        let partial_merges_total = IntCounter::new(
            "cohort_engine_partial_merges_total",
            "Updates merged with tolerated provider failures",
        )?;
        registry.register(Box::new(partial_merges_total.clone()))?;

        let report_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "cohort_engine_report_duration_seconds",
            "Progress report generation duration in seconds",
        ))?;
        registry.register(Box::new(report_duration_seconds.clone()))?;

        Ok(Self {
            updates_total,
            autopicks_total,
            partial_merges_total,
            report_duration_seconds,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _provider = collector.provider();
        let _engine = collector.engine();
    }

    #[test]
    fn test_fetch_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_fetch(RatingSystem::Lichess, "success", Duration::from_millis(40));
        collector.record_fetch(RatingSystem::Lichess, "timeout", Duration::from_millis(500));

        assert_eq!(
            collector
                .provider()
                .fetches_total
                .with_label_values(&["lichess", "success"])
                .get(),
            1
        );
        assert_eq!(
            collector
                .provider()
                .fetch_duration_seconds
                .with_label_values(&["lichess"])
                .get_sample_count(),
            2
        );
    }

    #[test]
    fn test_partial_merges_counted() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_update("success", 0);
        collector.record_update("partial", 2);

        assert_eq!(collector.engine().partial_merges_total.get(), 1);
        assert_eq!(
            collector
                .engine()
                .updates_total
                .with_label_values(&["partial"])
                .get(),
            1
        );
    }

    #[test]
    fn test_fetch_outcome_labels() {
        assert_eq!(fetch_outcome_label(&Ok(1500)), "success");
        assert_eq!(
            fetch_outcome_label(&Err(FetchError::Timeout { timeout_ms: 10 })),
            "timeout"
        );
        assert_eq!(
            fetch_outcome_label(&Err(FetchError::NotFound {
                username: "ghost".to_string()
            })),
            "not_found"
        );
    }

    #[test]
    fn test_render_text_format() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        collector.record_autopick("success");

        let output = collector.render().unwrap();
        assert!(output.contains("cohort_engine_autopicks_total"));
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();

        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
