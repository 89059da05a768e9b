//! Demo Orchestrator Binary
//!
//! Wires the lifecycle controller against a scripted mock generation backend
//! and runs a few dispatches through the full loop: cache miss, progress
//! pings, success, a cache hit, a backend failure, and a cancellation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tracing::info;

use stride_core::config::OrchestratorConfig;
use stride_core::constants::events;
use stride_core::events::{request_id_of, EventBus};
use stride_core::logging::init_structured_logging;
use stride_core::orchestration::{LogNotificationBridge, RequestKind, RequestLifecycleController};

/// Mock generation backend: answers `route:requested` with two progress
/// pings and a ready event, and `ghostRunner:requested` with a failure.
fn spawn_mock_backend(bus: EventBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            let Some(id) = request_id_of(&event.context) else {
                continue;
            };

            match event.name.as_str() {
                "route:requested" => {
                    for progress in [30u8, 70] {
                        tokio::time::sleep(Duration::from_millis(150)).await;
                        let _ = bus
                            .publish(
                                "routeProcessing",
                                json!({"requestId": id.to_string(), "progress": progress}),
                            )
                            .await;
                    }
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    let _ = bus
                        .publish(
                            "routeReady",
                            json!({
                                "requestId": id.to_string(),
                                "result": {
                                    "distance": 5000,
                                    "waypoints": [[13.384, 52.506], [13.391, 52.511]],
                                }
                            }),
                        )
                        .await;
                }
                "ghostRunner:requested" => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    let _ = bus
                        .publish(
                            "ghostRunnerFailed",
                            json!({"requestId": id.to_string(), "error": "model overload"}),
                        )
                        .await;
                }
                _ => {}
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    init_structured_logging();

    let controller = RequestLifecycleController::with_config(
        OrchestratorConfig::from_env()?,
        Arc::new(LogNotificationBridge),
    );
    spawn_mock_backend(controller.bus().clone());

    // Observe the status broadcast like a debug surface would
    let mut status_rx = controller.bus().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = status_rx.recv().await {
            if event.name == events::REQUEST_STATUS_CHANGED {
                info!(status = %event.context, "Status broadcast");
            }
        }
    });

    let route_params = json!({"goals": ["exploration"], "distance": 5000});

    info!("Dispatching route request (cache miss)");
    controller
        .dispatch(
            RequestKind::Route,
            route_params.clone(),
            controller.options_for(RequestKind::Route),
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(700)).await;

    info!("Dispatching identical route request (cache hit, no bus emission)");
    controller
        .dispatch(
            RequestKind::Route,
            route_params,
            controller.options_for(RequestKind::Route),
        )
        .await?;

    info!("Dispatching ghost runner request (backend failure)");
    controller
        .dispatch(
            RequestKind::GhostRunner,
            json!({"pace": "5:30", "distance": 3000}),
            controller.options_for(RequestKind::GhostRunner),
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    info!("Dispatching territory analysis and cancelling it");
    let cancelled = controller
        .dispatch(
            RequestKind::TerritoryAnalysis,
            json!({"zone": {"lat": 52.5, "lng": 13.4}}),
            controller.options_for(RequestKind::TerritoryAnalysis),
        )
        .await?;
    controller.cancel_request(cancelled).await?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    for status in controller.get_active_requests()? {
        info!(
            request_id = %status.id,
            kind = %status.kind,
            state = %status.state,
            "Final registry record"
        );
    }

    Ok(())
}
