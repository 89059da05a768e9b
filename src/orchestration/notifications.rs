//! # Notification Bridge
//!
//! Boundary contract between the orchestration core and the UI layer. The
//! core invokes exactly one "show result" call per terminal transition: a
//! success with its payload, or an error with its message and a retry
//! callback. Cancellation is user-initiated and produces no call at all.
//!
//! The default implementation only logs; the real UI bridge (toasts, sounds)
//! lives outside this crate and implements the same trait.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::orchestration::types::RequestKind;

/// Tone played alongside a result notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

/// Retry affordance handed to the UI with an error notification.
///
/// Invoking it performs a brand-new dispatch with a brand-new request id;
/// the orchestrator never retries on its own.
pub type RetryCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Contract the core satisfies toward the UI layer
#[async_trait]
pub trait NotificationBridge: Send + Sync {
    /// Deliver a successful generation result
    async fn show_success(&self, kind: RequestKind, payload: Value);

    /// Deliver a failure message together with a retry affordance
    async fn show_error(&self, kind: RequestKind, message: String, retry: RetryCallback);

    /// Play a result tone
    fn play_sound(&self, tone: Tone);
}

/// Logging-only bridge used when no UI layer is attached
#[derive(Debug, Default)]
pub struct LogNotificationBridge;

#[async_trait]
impl NotificationBridge for LogNotificationBridge {
    async fn show_success(&self, kind: RequestKind, payload: Value) {
        info!(kind = %kind, payload = %payload, "Generation succeeded");
    }

    async fn show_error(&self, kind: RequestKind, message: String, _retry: RetryCallback) {
        error!(kind = %kind, message = message, "Generation failed");
    }

    fn play_sound(&self, tone: Tone) {
        info!(tone = ?tone, "Result tone");
    }
}

pub mod testing {
    //! Recording bridge for asserting the exactly-once notification contract
    //! in unit and integration tests.

    use super::*;
    use std::sync::Mutex;

    /// A single recorded notification
    #[derive(Debug, Clone)]
    pub enum Notification {
        Success { kind: RequestKind, payload: Value },
        Error { kind: RequestKind, message: String },
    }

    /// Bridge that records every call for later assertions
    #[derive(Default)]
    pub struct RecordingBridge {
        pub notifications: Mutex<Vec<Notification>>,
        pub tones: Mutex<Vec<Tone>>,
        pub retries: Mutex<Vec<RetryCallback>>,
    }

    impl RecordingBridge {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn notification_count(&self) -> usize {
            self.notifications.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NotificationBridge for RecordingBridge {
        async fn show_success(&self, kind: RequestKind, payload: Value) {
            self.notifications
                .lock()
                .unwrap()
                .push(Notification::Success { kind, payload });
        }

        async fn show_error(&self, kind: RequestKind, message: String, retry: RetryCallback) {
            self.notifications
                .lock()
                .unwrap()
                .push(Notification::Error { kind, message });
            self.retries.lock().unwrap().push(retry);
        }

        fn play_sound(&self, tone: Tone) {
            self.tones.lock().unwrap().push(tone);
        }
    }
}
