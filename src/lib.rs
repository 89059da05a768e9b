#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Stride Core
//!
//! Asynchronous AI-request orchestration core for the Stride running game.
//!
//! ## Overview
//!
//! Stride layers AI route planning, "ghost runner" opponent generation, and
//! territory analysis onto a map-based running experience. Every call to the
//! generation backend flows through this crate: requests are dispatched as
//! bus events carrying fresh ids, id-scoped completion events race a timeout
//! timer, and each request reaches exactly one terminal outcome — even when
//! responses arrive late, twice, or after cancellation.
//!
//! ## Architecture
//!
//! The core is message-passing all the way down. The generation backend is an
//! opaque responder on the event bus, swappable for a mock in tests; the UI
//! layer consumes status broadcasts and the notification bridge. Nothing here
//! renders, persists, or talks to the network.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Lifecycle controller, registry, cache, notifications
//! - [`events`] - Broadcast event bus and payload helpers
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`validation`] - Request parameter validation
//! - [`logging`] - Structured logging setup
//! - [`constants`] - Event names, default timeouts, grace windows
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use stride_core::config::OrchestratorConfig;
//! use stride_core::orchestration::{
//!     LogNotificationBridge, RequestKind, RequestLifecycleController, RequestOptions,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = RequestLifecycleController::with_config(
//!     OrchestratorConfig::from_env()?,
//!     Arc::new(LogNotificationBridge),
//! );
//!
//! let id = controller
//!     .dispatch(
//!         RequestKind::Route,
//!         json!({"goals": ["exploration"], "distance": 5000}),
//!         RequestOptions::for_kind(RequestKind::Route),
//!     )
//!     .await?;
//!
//! println!("dispatched request {id}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod orchestration;
pub mod validation;

pub use config::OrchestratorConfig;
pub use error::{Result, StrideError};
pub use events::{BusEvent, EventBus};
pub use orchestration::{
    LogNotificationBridge, NotificationBridge, OrchestrationError, OrchestrationResult,
    RequestId, RequestKind, RequestLifecycleController, RequestOptions, RequestRegistry,
    RequestState, RequestStatus, ResponseCache,
};
