//! # Request Registry
//!
//! Tracks one [`RequestStatus`] record per in-flight or recently-terminal
//! request id and broadcasts every mutation on the event bus.
//!
//! ## Architecture
//!
//! The registry is the single writer surface for status records:
//! - **Thread-safe operations** using RwLock for concurrent access
//! - **Status broadcasting**: every create/update publishes
//!   `orchestrator:requestStatusChanged` with the full serialized record
//! - **Terminal fencing**: updates against a terminal record are dropped,
//!   never re-applied
//! - **Deferred garbage collection**: terminal records are deleted after a
//!   grace window, purely for memory hygiene
//!
//! ## Usage
//!
//! ```rust
//! use stride_core::events::EventBus;
//! use stride_core::orchestration::registry::RequestRegistry;
//! use stride_core::orchestration::types::{RequestId, RequestKind, RequestStatus};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let bus = EventBus::default();
//! let registry = RequestRegistry::new(bus, Duration::from_secs(30));
//!
//! let id = RequestId::new();
//! registry
//!     .create(RequestStatus::pending(id, RequestKind::Route))
//!     .await
//!     .unwrap();
//! assert_eq!(registry.list_active().unwrap().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::constants::{events, MAX_PROGRESS};
use crate::events::EventBus;
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::types::{RequestId, RequestState, RequestStatus, StatusPatch};

/// Counts of registry records by lifecycle phase, for debug surfaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub active: usize,
    pub terminal: usize,
}

/// Registry of request status records with status broadcasting and deferred
/// cleanup of terminal entries
pub struct RequestRegistry {
    records: Arc<RwLock<HashMap<RequestId, RequestStatus>>>,
    bus: EventBus,
    gc_grace: Duration,
}

impl RequestRegistry {
    /// Create a new registry broadcasting on the given bus
    pub fn new(bus: EventBus, gc_grace: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            bus,
            gc_grace,
        }
    }

    /// Register a fresh status record.
    ///
    /// Ids are generated per dispatch attempt and never reused, so a
    /// collision indicates a caller bug and is rejected.
    pub async fn create(&self, status: RequestStatus) -> OrchestrationResult<()> {
        let id = status.id;

        {
            let mut records = self.records.write().map_err(lock_error)?;
            if records.contains_key(&id) {
                return Err(OrchestrationError::internal(format!(
                    "Request id {id} already registered"
                )));
            }
            records.insert(id, status.clone());
        }

        debug!(request_id = %id, kind = %status.kind, "Request registered");
        self.broadcast(&status).await;

        if status.state.is_terminal() {
            self.schedule_gc(id);
        }
        Ok(())
    }

    /// Apply a partial update to a record and broadcast the result.
    ///
    /// Returns the updated record, or `None` when the record is unknown or
    /// already terminal. Attempts to mutate a terminal record are dropped
    /// silently: late bus events for a finished request must not re-apply.
    pub async fn update(
        &self,
        id: RequestId,
        patch: StatusPatch,
    ) -> OrchestrationResult<Option<RequestStatus>> {
        let updated = {
            let mut records = self.records.write().map_err(lock_error)?;
            match records.get_mut(&id) {
                None => {
                    debug!(request_id = %id, "Update for unknown request dropped");
                    None
                }
                Some(record) if record.state.is_terminal() => {
                    debug!(
                        request_id = %id,
                        state = %record.state,
                        "Update for terminal request dropped"
                    );
                    None
                }
                Some(record) => {
                    if let Some(state) = patch.state {
                        record.state = state;
                    }
                    if let Some(progress) = patch.progress {
                        record.progress = progress.min(MAX_PROGRESS);
                    }
                    if record.state == RequestState::Success {
                        record.progress = MAX_PROGRESS;
                    }
                    record.error = match record.state {
                        RequestState::Error => patch.error.clone(),
                        _ => None,
                    };
                    record.last_updated_at = Utc::now();
                    Some(record.clone())
                }
            }
        };

        if let Some(status) = &updated {
            debug!(
                request_id = %id,
                state = %status.state,
                progress = status.progress,
                "Request status updated"
            );
            self.broadcast(status).await;

            if status.state.is_terminal() {
                self.schedule_gc(id);
            }
        }
        Ok(updated)
    }

    /// Get a single status record
    pub fn get(&self, id: RequestId) -> OrchestrationResult<Option<RequestStatus>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.get(&id).cloned())
    }

    /// List every record still held, terminal-but-not-yet-collected included
    pub fn list_active(&self) -> OrchestrationResult<Vec<RequestStatus>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.values().cloned().collect())
    }

    /// Remove a record outright, without broadcasting
    pub fn delete(&self, id: RequestId) -> OrchestrationResult<bool> {
        let mut records = self.records.write().map_err(lock_error)?;
        let removed = records.remove(&id).is_some();
        if removed {
            debug!(request_id = %id, "Request record deleted");
        }
        Ok(removed)
    }

    /// Get registry statistics
    pub fn stats(&self) -> OrchestrationResult<RegistryStats> {
        let records = self.records.read().map_err(lock_error)?;
        let active = records.values().filter(|r| r.state.is_active()).count();
        Ok(RegistryStats {
            total: records.len(),
            active,
            terminal: records.len() - active,
        })
    }

    /// Broadcast the full record on the status-changed channel
    async fn broadcast(&self, status: &RequestStatus) {
        match serde_json::to_value(status) {
            Ok(context) => {
                if let Err(e) = self
                    .bus
                    .publish(events::REQUEST_STATUS_CHANGED, context)
                    .await
                {
                    warn!(request_id = %status.id, error = %e, "Status broadcast failed");
                }
            }
            Err(e) => {
                warn!(request_id = %status.id, error = %e, "Status record serialization failed");
            }
        }
    }

    /// Schedule deferred deletion of a terminal record.
    ///
    /// The grace window keeps terminal records visible to `list_active` long
    /// enough for debug surfaces; deletion afterwards does not affect
    /// already-delivered notifications.
    fn schedule_gc(&self, id: RequestId) {
        let records = Arc::clone(&self.records);
        let grace = self.gc_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if let Ok(mut records) = records.write() {
                if records.remove(&id).is_some() {
                    info!(request_id = %id, "Terminal request record collected");
                }
            }
        });
    }
}

impl Clone for RequestRegistry {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            bus: self.bus.clone(),
            gc_grace: self.gc_grace,
        }
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> OrchestrationError {
    OrchestrationError::internal(format!("Registry lock poisoned: {e}"))
}
