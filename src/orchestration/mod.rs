//! # Orchestration Engine
//!
//! Asynchronous AI-request orchestration: request lifecycle management,
//! status tracking, response caching, and cancellation semantics.
//!
//! ## Core Components
//!
//! - **RequestLifecycleController**: accepts typed requests, checks the cache,
//!   dispatches bus events, and races id-scoped completion events against a
//!   timeout timer — exactly one terminal outcome per request
//! - **RequestRegistry**: one status record per live request id, broadcast on
//!   every mutation, garbage collected after a grace window
//! - **ResponseCache**: lazy-TTL store of successful results under canonical
//!   request signatures
//! - **NotificationBridge**: the boundary contract toward the UI layer

pub mod cache;
pub mod errors;
pub mod lifecycle;
pub mod notifications;
pub mod registry;
pub mod types;

// Re-export core types and components for easy access
pub use cache::{canonical_key, ResponseCache};
pub use errors::{OrchestrationError, OrchestrationResult};
pub use lifecycle::RequestLifecycleController;
pub use notifications::{LogNotificationBridge, NotificationBridge, RetryCallback, Tone};
pub use registry::{RegistryStats, RequestRegistry};
pub use types::{RequestId, RequestKind, RequestOptions, RequestState, RequestStatus, StatusPatch};
