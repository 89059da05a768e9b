//! # Orchestrator Configuration
//!
//! Environment-aware configuration for the orchestration core. Defaults suit
//! production; `from_env` overlays `STRIDE_*` variables and `for_test` swaps
//! in short windows for rapid test feedback.

use crate::constants;
use crate::error::{Result, StrideError};
use std::time::Duration;

/// Configuration for the orchestration core
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Capacity of the broadcast bus channel
    pub bus_capacity: usize,
    /// Grace window before terminal status records are garbage collected
    pub gc_grace: Duration,
    /// Default read-time ttl for cached generation results
    pub cache_ttl: Duration,
    /// Whether dispatches consult the response cache unless told otherwise
    pub cache_enabled: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bus_capacity: constants::DEFAULT_BUS_CAPACITY,
            gc_grace: constants::DEFAULT_GC_GRACE,
            cache_ttl: constants::DEFAULT_CACHE_TTL,
            cache_enabled: true,
        }
    }
}

impl OrchestratorConfig {
    /// Build configuration from defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("STRIDE_BUS_CAPACITY") {
            config.bus_capacity = capacity.parse().map_err(|e| {
                StrideError::ConfigurationError(format!("Invalid STRIDE_BUS_CAPACITY: {e}"))
            })?;
        }

        if let Ok(grace_ms) = std::env::var("STRIDE_GC_GRACE_MS") {
            let ms: u64 = grace_ms.parse().map_err(|e| {
                StrideError::ConfigurationError(format!("Invalid STRIDE_GC_GRACE_MS: {e}"))
            })?;
            config.gc_grace = Duration::from_millis(ms);
        }

        if let Ok(ttl_ms) = std::env::var("STRIDE_CACHE_TTL_MS") {
            let ms: u64 = ttl_ms.parse().map_err(|e| {
                StrideError::ConfigurationError(format!("Invalid STRIDE_CACHE_TTL_MS: {e}"))
            })?;
            config.cache_ttl = Duration::from_millis(ms);
        }

        if let Ok(enabled) = std::env::var("STRIDE_CACHE_ENABLED") {
            config.cache_enabled = enabled.parse().map_err(|e| {
                StrideError::ConfigurationError(format!("Invalid STRIDE_CACHE_ENABLED: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Test-optimized configuration with rapid collection and a small bus
    pub fn for_test() -> Self {
        Self {
            bus_capacity: 256,
            gc_grace: Duration::from_millis(100),
            cache_ttl: Duration::from_millis(500),
            cache_enabled: true,
        }
    }
}
