//! # System Constants
//!
//! Core constants that define the operational boundaries of the Stride
//! AI-request orchestration core.
//!
//! Event name constants and builders here mirror the wire protocol spoken by
//! the browser client and the generation backend, so the strings are
//! camelCase JSON conventions rather than Rust ones.

use std::time::Duration;

use crate::orchestration::types::RequestKind;

/// Bus event names and builders for the orchestration wire protocol
pub mod events {
    use super::RequestKind;

    /// Global status broadcast carrying the full serialized `RequestStatus`
    pub const REQUEST_STATUS_CHANGED: &str = "orchestrator:requestStatusChanged";

    /// Payload field carrying the request id on every id-scoped event
    pub const REQUEST_ID_FIELD: &str = "requestId";

    /// Event emitted by the core to ask the backend for a generation,
    /// e.g. `route:requested`
    pub fn requested(kind: RequestKind) -> String {
        format!("{}:requested", kind.as_str())
    }

    /// Success event consumed by the core, e.g. `routeReady`
    pub fn ready(kind: RequestKind) -> String {
        format!("{}Ready", kind.as_str())
    }

    /// Failure event consumed by the core, e.g. `routeFailed`
    pub fn failed(kind: RequestKind) -> String {
        format!("{}Failed", kind.as_str())
    }

    /// Progress ping consumed by the core, e.g. `routeProcessing`
    pub fn processing(kind: RequestKind) -> String {
        format!("{}Processing", kind.as_str())
    }
}

/// Default completion timeout for route generation requests
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_millis(25_000);

/// Default completion timeout for ghost runner generation requests
pub const DEFAULT_GHOST_RUNNER_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Default completion timeout for territory analysis requests
pub const DEFAULT_TERRITORY_ANALYSIS_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default time-to-live for cached generation results
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(300_000);

/// Grace window before a terminal status record is garbage collected
pub const DEFAULT_GC_GRACE: Duration = Duration::from_millis(30_000);

/// Default capacity of the broadcast bus channel
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Error message recorded when the completion race is won by the timer
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

/// Upper bound for the informational progress field
pub const MAX_PROGRESS: u8 = 100;
