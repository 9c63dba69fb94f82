//! Configuration management for the cohort engine
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values for providers, the reconciliation
//! engine and the cohort threshold tables.

pub mod app;
pub mod cohorts;
pub mod engine;
pub mod providers;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use cohorts::{CohortSettings, SystemThresholds};
pub use engine::EngineSettings;
pub use providers::ProviderSettings;
