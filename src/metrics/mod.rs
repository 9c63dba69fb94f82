//! Metrics and monitoring for the cohort engine
//!
//! This module provides Prometheus metrics for provider fetches and engine
//! operations.

pub mod collector;

pub use collector::{
    fetch_outcome_label, EngineMetrics, MetricsCollector, MetricsTimer, ProviderMetrics,
};
