//! # Event Bus
//!
//! Publish/subscribe transport for the orchestration core, built on
//! [`tokio::sync::broadcast`]. Events are named JSON payloads; the core emits
//! generation requests and status broadcasts on it and consumes the backend's
//! ready/failed/processing events from it.
//!
//! Publishing to a bus with no subscribers is not an error: the backend
//! responder and any observability consumers attach independently of the
//! core's lifecycle.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::constants::DEFAULT_BUS_CAPACITY;

/// Event carried over the bus
#[derive(Debug, Clone)]
pub struct BusEvent {
    pub name: String,
    pub context: Value,
    pub published_at: DateTime<Utc>,
}

impl BusEvent {
    /// Create a new event with the current timestamp
    pub fn new(name: impl Into<String>, context: Value) -> Self {
        Self {
            name: name.into(),
            context,
            published_at: Utc::now(),
        }
    }
}

/// Broadcast event bus shared by the orchestration core, the generation
/// backend, and observability consumers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a new bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event with the given name and context
    pub async fn publish(
        &self,
        event_name: impl Into<String>,
        context: Value,
    ) -> Result<(), PublishError> {
        let event = BusEvent::new(event_name, context);

        // For broadcast channels, send() returns an error if there are no
        // subscribers. We publish regardless of whether anyone is listening.
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Subscribe to all events on the bus
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

/// Error types for bus publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Event channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
