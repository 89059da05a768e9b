//! # Request Lifecycle Controller
//!
//! The core state machine of the orchestration engine. A dispatch checks the
//! response cache, otherwise registers a pending status, emits a
//! `"<kind>:requested"` bus event carrying a fresh id, and races the backend's
//! id-scoped completion events against a timeout timer. Exactly one of
//! {success, error, timeout, cancellation} wins; the losers are retired the
//! moment the race resolves.
//!
//! ## First signal wins
//!
//! Each in-flight request owns a single-resolution completion slot: a oneshot
//! sender behind a mutex that is consumed by whichever signal arrives first.
//! Resolution ends the driver task, which drops its bus subscription and the
//! timer with it, so no listener or timer outlives the race on any exit path.
//! Late bus events for a finished id find no slot to resolve and fall through
//! to the registry, which refuses mutations of terminal records — the same
//! fence that makes cancellation permanent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use stride_core::config::OrchestratorConfig;
//! use stride_core::orchestration::lifecycle::RequestLifecycleController;
//! use stride_core::orchestration::notifications::LogNotificationBridge;
//! use stride_core::orchestration::types::{RequestKind, RequestOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = RequestLifecycleController::with_config(
//!     OrchestratorConfig::default(),
//!     Arc::new(LogNotificationBridge),
//! );
//!
//! let params = json!({"goals": ["exploration"], "distance": 5000});
//! let id = controller
//!     .dispatch(RequestKind::Route, params, RequestOptions::for_kind(RequestKind::Route))
//!     .await?;
//! controller.cancel_request(id).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::config::OrchestratorConfig;
use crate::constants::{events, TIMEOUT_MESSAGE};
use crate::events::{
    error_message_of, payload_of, progress_of, request_id_of, with_request_id, BusEvent, EventBus,
};
use crate::orchestration::cache::{canonical_key, ResponseCache};
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::notifications::{NotificationBridge, RetryCallback, Tone};
use crate::orchestration::registry::RequestRegistry;
use crate::orchestration::types::{
    RequestId, RequestKind, RequestOptions, RequestState, RequestStatus, StatusPatch,
};
use crate::validation::validate_request_params;

/// Authoritative result of a request's completion race
#[derive(Debug)]
enum Outcome {
    Success(Value),
    Failed(String),
    Cancelled,
}

/// Single-resolution completion primitive for one in-flight request.
///
/// The first caller to take the sender wins the race; every later resolution
/// attempt finds the slot empty and is ignored.
#[derive(Clone)]
struct CompletionSlot {
    sender: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

impl CompletionSlot {
    fn new() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Resolve the race with the given outcome. Returns true if this call won.
    fn resolve(&self, outcome: Outcome) -> bool {
        match self.sender.lock().take() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

/// Lifecycle controller for AI generation requests.
///
/// Cheap to clone; clones share the bus, registry, cache, and in-flight
/// table. Construct one per orchestrator and inject its collaborators
/// explicitly — there is deliberately no global instance.
pub struct RequestLifecycleController {
    config: OrchestratorConfig,
    bus: EventBus,
    registry: RequestRegistry,
    cache: ResponseCache,
    notifier: Arc<dyn NotificationBridge>,
    inflight: Arc<DashMap<RequestId, CompletionSlot>>,
}

impl RequestLifecycleController {
    /// Create a controller from explicitly constructed collaborators
    pub fn new(
        config: OrchestratorConfig,
        bus: EventBus,
        registry: RequestRegistry,
        cache: ResponseCache,
        notifier: Arc<dyn NotificationBridge>,
    ) -> Self {
        info!("Creating RequestLifecycleController");
        Self {
            config,
            bus,
            registry,
            cache,
            notifier,
            inflight: Arc::new(DashMap::new()),
        }
    }

    /// Wire a controller and its collaborators from configuration
    pub fn with_config(config: OrchestratorConfig, notifier: Arc<dyn NotificationBridge>) -> Self {
        let bus = EventBus::new(config.bus_capacity);
        let registry = RequestRegistry::new(bus.clone(), config.gc_grace);
        Self::new(config, bus, registry, ResponseCache::new(), notifier)
    }

    /// Per-dispatch options seeded from this controller's configured cache
    /// policy and the kind's default timeout
    pub fn options_for(&self, kind: RequestKind) -> RequestOptions {
        RequestOptions::for_kind(kind)
            .with_cache(self.config.cache_enabled)
            .with_cache_ttl(self.config.cache_ttl)
    }

    /// The bus this controller emits on and listens to
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The registry of status records
    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    /// Dispatch a generation request.
    ///
    /// Returns the id of the dispatch attempt; the result itself is delivered
    /// through the notification bridge and the status broadcast, never as a
    /// return value. A cache hit short-circuits into a synthesized terminal
    /// success without any bus emission.
    #[instrument(skip(self, params), fields(kind = %kind))]
    pub async fn dispatch(
        &self,
        kind: RequestKind,
        params: Value,
        options: RequestOptions,
    ) -> OrchestrationResult<RequestId> {
        validate_request_params(&params)
            .map_err(|e| OrchestrationError::invalid_parameters(e.to_string()))?;

        let cache_key = options
            .cache_enabled
            .then(|| canonical_key(kind, &params));

        if let Some(key) = &cache_key {
            if let Some(payload) = self.cache.get(key, options.cache_ttl).await {
                return self.complete_from_cache(kind, payload).await;
            }
        }

        let id = RequestId::new();
        self.registry
            .create(RequestStatus::pending(id, kind))
            .await?;

        // Subscribe before emitting so a same-tick backend response cannot
        // slip past the race.
        let bus_rx = self.bus.subscribe();
        let (slot, completion_rx) = CompletionSlot::new();
        self.inflight.insert(id, slot.clone());

        let requested = events::requested(kind);
        let wire_params = with_request_id(&params, id);
        if let Err(e) = self.bus.publish(requested.as_str(), wire_params).await {
            self.inflight.remove(&id);
            self.registry
                .update(
                    id,
                    StatusPatch::terminal(RequestState::Error, Some(e.to_string())),
                )
                .await?;
            return Err(OrchestrationError::publish_failed(requested, e.to_string()));
        }

        debug!(request_id = %id, timeout_ms = options.timeout.as_millis() as u64, "Request dispatched");

        let driver = self.clone();
        tokio::spawn(async move {
            driver
                .drive(id, kind, params, options, cache_key, slot, completion_rx, bus_rx)
                .await;
        });

        Ok(id)
    }

    /// Cancel a request if it is still live.
    ///
    /// Cancellation is a permanent fence: the status moves to `cancelled`
    /// immediately and any bus event for this id arriving afterwards is
    /// silently discarded. Cancelling an already-terminal or unknown id is an
    /// idempotent no-op. No notification is shown — cancellation is
    /// user-initiated and expected.
    pub async fn cancel_request(&self, id: RequestId) -> OrchestrationResult<()> {
        let resolved = match self.inflight.get(&id) {
            Some(slot) => slot.resolve(Outcome::Cancelled),
            None => false,
        };

        if resolved {
            info!(request_id = %id, "Request cancelled");
            self.registry
                .update(id, StatusPatch::terminal(RequestState::Cancelled, None))
                .await?;
        } else {
            debug!(request_id = %id, "Cancel ignored for terminal or unknown request");
        }
        Ok(())
    }

    /// List every status record still held by the registry
    pub fn get_active_requests(&self) -> OrchestrationResult<Vec<RequestStatus>> {
        self.registry.list_active()
    }

    /// Drop every cached generation result
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Cache hit: synthesize a terminal success and run the live success
    /// notification path, with no bus emission.
    async fn complete_from_cache(
        &self,
        kind: RequestKind,
        payload: Value,
    ) -> OrchestrationResult<RequestId> {
        let id = RequestId::new();
        debug!(request_id = %id, kind = %kind, "Serving request from cache");

        self.registry
            .create(RequestStatus::cached_success(id, kind))
            .await?;
        self.notifier.show_success(kind, payload).await;
        self.notifier.play_sound(Tone::Success);
        Ok(id)
    }

    /// Drive one request's completion race to its single authoritative
    /// outcome, then finalize.
    #[allow(clippy::too_many_arguments)]
    async fn drive(
        &self,
        id: RequestId,
        kind: RequestKind,
        params: Value,
        options: RequestOptions,
        cache_key: Option<String>,
        slot: CompletionSlot,
        mut completion_rx: oneshot::Receiver<Outcome>,
        mut bus_rx: broadcast::Receiver<BusEvent>,
    ) {
        let ready = events::ready(kind);
        let failed = events::failed(kind);
        let processing = events::processing(kind);

        let timer = tokio::time::sleep(options.timeout);
        tokio::pin!(timer);
        let mut timer_armed = true;
        let mut bus_open = true;

        let outcome = loop {
            tokio::select! {
                resolved = &mut completion_rx => {
                    // Sender can only drop after resolution, so Err is
                    // unreachable; treat it as cancellation if it ever fires.
                    break resolved.unwrap_or(Outcome::Cancelled);
                }
                () = &mut timer, if timer_armed => {
                    timer_armed = false;
                    slot.resolve(Outcome::Failed(TIMEOUT_MESSAGE.to_string()));
                    // The resolution (ours or an earlier one) arrives on
                    // completion_rx in the next iteration.
                }
                event = bus_rx.recv(), if bus_open => {
                    match event {
                        Ok(event) => self.observe(id, &event, &ready, &failed, &processing, &slot).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(request_id = %id, skipped = skipped, "Bus receiver lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            bus_open = false;
                        }
                    }
                }
            }
        };

        self.inflight.remove(&id);
        self.finalize(id, kind, params, options, cache_key, outcome)
            .await;
    }

    /// Classify one bus event against this request's race
    async fn observe(
        &self,
        id: RequestId,
        event: &BusEvent,
        ready: &str,
        failed: &str,
        processing: &str,
        slot: &CompletionSlot,
    ) {
        if request_id_of(&event.context) != Some(id) {
            return;
        }

        if event.name == ready {
            slot.resolve(Outcome::Success(payload_of(&event.context)));
        } else if event.name == failed {
            slot.resolve(Outcome::Failed(error_message_of(&event.context)));
        } else if event.name == processing {
            // Progress pings never affect the termination race
            if let Some(progress) = progress_of(&event.context) {
                if let Err(e) = self.registry.update(id, StatusPatch::progress(progress)).await {
                    warn!(request_id = %id, error = %e, "Progress update failed");
                }
            }
        }
    }

    /// Apply the authoritative outcome: registry transition, cache
    /// population, and exactly one notification for success or error.
    async fn finalize(
        &self,
        id: RequestId,
        kind: RequestKind,
        params: Value,
        options: RequestOptions,
        cache_key: Option<String>,
        outcome: Outcome,
    ) {
        match outcome {
            Outcome::Success(payload) => {
                info!(request_id = %id, kind = %kind, "Request succeeded");
                if let Err(e) = self
                    .registry
                    .update(id, StatusPatch::terminal(RequestState::Success, None))
                    .await
                {
                    warn!(request_id = %id, error = %e, "Terminal update failed");
                }
                if let Some(key) = cache_key {
                    self.cache.put(key, payload.clone()).await;
                }
                self.notifier.show_success(kind, payload).await;
                self.notifier.play_sound(Tone::Success);
            }
            Outcome::Failed(message) => {
                warn!(request_id = %id, kind = %kind, message = message, "Request failed");
                if let Err(e) = self
                    .registry
                    .update(
                        id,
                        StatusPatch::terminal(RequestState::Error, Some(message.clone())),
                    )
                    .await
                {
                    warn!(request_id = %id, error = %e, "Terminal update failed");
                }
                let retry = self.retry_callback(kind, params, options);
                self.notifier.show_error(kind, message, retry).await;
                self.notifier.play_sound(Tone::Error);
            }
            Outcome::Cancelled => {
                // cancel_request already transitioned the record; this update
                // is a no-op unless the slot resolved without it.
                if let Err(e) = self
                    .registry
                    .update(id, StatusPatch::terminal(RequestState::Cancelled, None))
                    .await
                {
                    warn!(request_id = %id, error = %e, "Terminal update failed");
                }
                debug!(request_id = %id, "Request finalized as cancelled");
            }
        }
    }

    /// Build the retry affordance for an error notification: a brand-new
    /// dispatch with a brand-new id, never a reuse of this one.
    fn retry_callback(
        &self,
        kind: RequestKind,
        params: Value,
        options: RequestOptions,
    ) -> RetryCallback {
        let controller = self.clone();
        Arc::new(move || {
            let controller = controller.clone();
            let params = params.clone();
            let options = options.clone();
            async move {
                if let Err(e) = controller.dispatch(kind, params, options).await {
                    warn!(kind = %kind, error = %e, "Retry dispatch rejected");
                }
            }
            .boxed()
        })
    }
}

impl Clone for RequestLifecycleController {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            bus: self.bus.clone(),
            registry: self.registry.clone(),
            cache: self.cache.clone(),
            notifier: Arc::clone(&self.notifier),
            inflight: Arc::clone(&self.inflight),
        }
    }
}
