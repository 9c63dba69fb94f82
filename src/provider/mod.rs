//! Rating provider adapters
//!
//! This module defines the adapter interface to external rating sources, the
//! live HTTP adapters and the registry mapping rating systems to adapters.

pub mod adapter;
pub mod chesscom;
pub mod fide;
pub mod http;
pub mod lichess;
pub mod registry;
pub mod static_provider;
pub mod uscf;

// Re-export commonly used types
pub use adapter::RatingProvider;
pub use registry::ProviderRegistry;
pub use static_provider::StaticRatingProvider;
