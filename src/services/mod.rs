pub mod freshness;
pub mod refresh_service;

pub use freshness::FreshnessGate;
pub use refresh_service::{RefreshService, RefreshStats};
