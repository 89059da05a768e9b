//! Integration tests for the request lifecycle: exactly-once terminal
//! outcomes, the cancellation fence, timeout determinism, and listener
//! hygiene, exercised through the public API with a scripted backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stride_core::config::OrchestratorConfig;
use stride_core::constants::{events, TIMEOUT_MESSAGE};
use stride_core::orchestration::notifications::testing::{Notification, RecordingBridge};
use stride_core::orchestration::{
    RequestKind, RequestLifecycleController, RequestOptions, RequestState,
};

fn controller_with(bridge: Arc<RecordingBridge>) -> RequestLifecycleController {
    RequestLifecycleController::with_config(OrchestratorConfig::for_test(), bridge)
}

fn options(kind: RequestKind) -> RequestOptions {
    RequestOptions::for_kind(kind).with_timeout(Duration::from_millis(500))
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}

#[tokio::test]
async fn test_idempotent_termination_under_duplicate_events() {
    let bridge = RecordingBridge::new();
    let controller = controller_with(Arc::clone(&bridge));

    let id = controller
        .dispatch(
            RequestKind::Route,
            json!({"distance": 5000}),
            options(RequestKind::Route),
        )
        .await
        .unwrap();

    // The backend answers success, then floods duplicates and a
    // contradictory failure for the same id.
    let success = json!({"requestId": id.to_string(), "result": {"waypoints": 5}});
    controller.bus().publish("routeReady", success.clone()).await.unwrap();
    settle().await;

    controller.bus().publish("routeReady", success.clone()).await.unwrap();
    controller
        .bus()
        .publish(
            "routeFailed",
            json!({"requestId": id.to_string(), "error": "late failure"}),
        )
        .await
        .unwrap();
    controller.bus().publish("routeReady", success).await.unwrap();
    settle().await;

    let status = controller.registry().get(id).unwrap().unwrap();
    assert_eq!(status.state, RequestState::Success);
    assert_eq!(status.error, None);

    // Exactly one notification despite four terminal signals
    assert_eq!(bridge.notification_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fires_at_deadline_never_before() {
    let bridge = RecordingBridge::new();
    let controller = controller_with(Arc::clone(&bridge));

    let id = controller
        .dispatch(
            RequestKind::Route,
            json!({"goals": ["exploration"]}),
            RequestOptions::for_kind(RequestKind::Route).with_timeout(Duration::from_millis(1000)),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(
        controller.registry().get(id).unwrap().unwrap().state,
        RequestState::Pending,
        "request must not expire before its deadline"
    );

    tokio::time::sleep(Duration::from_millis(2)).await;
    tokio::task::yield_now().await;

    let status = controller.registry().get(id).unwrap().unwrap();
    assert_eq!(status.state, RequestState::Error);
    assert_eq!(status.error.as_deref(), Some(TIMEOUT_MESSAGE));

    match &bridge.notifications.lock().unwrap()[0] {
        Notification::Error { message, .. } => assert_eq!(message, TIMEOUT_MESSAGE),
        other => panic!("expected error notification, got {other:?}"),
    };
}

#[tokio::test]
async fn test_cancellation_fence_discards_late_success() {
    let bridge = RecordingBridge::new();
    let controller = controller_with(Arc::clone(&bridge));

    let id = controller
        .dispatch(
            RequestKind::GhostRunner,
            json!({"pace": "6:00"}),
            options(RequestKind::GhostRunner),
        )
        .await
        .unwrap();

    controller.cancel_request(id).await.unwrap();
    assert_eq!(
        controller.registry().get(id).unwrap().unwrap().state,
        RequestState::Cancelled
    );

    controller
        .bus()
        .publish(
            "ghostRunnerReady",
            json!({"requestId": id.to_string(), "result": {"name": "Phantom"}}),
        )
        .await
        .unwrap();
    settle().await;

    assert_eq!(
        controller.registry().get(id).unwrap().unwrap().state,
        RequestState::Cancelled
    );
    // Cancellation is user-initiated: no notification at all
    assert_eq!(bridge.notification_count(), 0);
    assert!(bridge.tones.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sequential_fast_dispatches_leave_no_listeners_or_records_leaking() {
    let bridge = RecordingBridge::new();
    let controller = controller_with(Arc::clone(&bridge));
    let baseline = controller.bus().subscriber_count();

    for i in 0..100 {
        let id = controller
            .dispatch(
                RequestKind::Route,
                json!({"distance": i}),
                options(RequestKind::Route).with_cache(false),
            )
            .await
            .unwrap();
        controller
            .bus()
            .publish(
                "routeReady",
                json!({"requestId": id.to_string(), "result": {"seq": i}}),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    settle().await;
    assert_eq!(
        controller.bus().subscriber_count(),
        baseline,
        "every driver must drop its bus subscription after resolution"
    );
    assert_eq!(bridge.notification_count(), 100);
}

#[tokio::test]
async fn test_terminal_records_collected_after_grace_window() {
    let bridge = RecordingBridge::new();
    // for_test grace is 100ms
    let controller = controller_with(Arc::clone(&bridge));

    let id = controller
        .dispatch(
            RequestKind::Route,
            json!({"distance": 5000}),
            options(RequestKind::Route),
        )
        .await
        .unwrap();
    controller
        .bus()
        .publish(
            "routeReady",
            json!({"requestId": id.to_string(), "result": {}}),
        )
        .await
        .unwrap();
    settle().await;

    // Terminal but still visible inside the grace window
    let listed = controller.get_active_requests().unwrap();
    assert!(listed.iter().any(|s| s.id == id));

    tokio::time::sleep(Duration::from_millis(200)).await;
    let listed = controller.get_active_requests().unwrap();
    assert!(!listed.iter().any(|s| s.id == id));
}

#[tokio::test]
async fn test_concurrent_requests_resolve_independently() {
    let bridge = RecordingBridge::new();
    let controller = controller_with(Arc::clone(&bridge));

    let route = controller
        .dispatch(
            RequestKind::Route,
            json!({"distance": 1000}),
            options(RequestKind::Route),
        )
        .await
        .unwrap();
    let ghost = controller
        .dispatch(
            RequestKind::GhostRunner,
            json!({"pace": "5:00"}),
            options(RequestKind::GhostRunner),
        )
        .await
        .unwrap();

    // Resolve them in reverse order with opposite outcomes
    controller
        .bus()
        .publish(
            "ghostRunnerFailed",
            json!({"requestId": ghost.to_string(), "error": "model overload"}),
        )
        .await
        .unwrap();
    controller
        .bus()
        .publish(
            "routeReady",
            json!({"requestId": route.to_string(), "result": {"waypoints": 2}}),
        )
        .await
        .unwrap();
    settle().await;

    assert_eq!(
        controller.registry().get(route).unwrap().unwrap().state,
        RequestState::Success
    );
    let ghost_status = controller.registry().get(ghost).unwrap().unwrap();
    assert_eq!(ghost_status.state, RequestState::Error);
    assert_eq!(ghost_status.error.as_deref(), Some("model overload"));
}

#[tokio::test]
async fn test_status_broadcasts_cover_full_lifecycle() {
    let bridge = RecordingBridge::new();
    let controller = controller_with(bridge);
    let mut rx = controller.bus().subscribe();

    let id = controller
        .dispatch(
            RequestKind::Route,
            json!({"distance": 2000}),
            options(RequestKind::Route),
        )
        .await
        .unwrap();
    controller
        .bus()
        .publish(
            "routeProcessing",
            json!({"requestId": id.to_string(), "progress": 60}),
        )
        .await
        .unwrap();
    controller
        .bus()
        .publish(
            "routeReady",
            json!({"requestId": id.to_string(), "result": {}}),
        )
        .await
        .unwrap();
    settle().await;

    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if event.name == events::REQUEST_STATUS_CHANGED
            && event.context["id"] == id.to_string()
        {
            states.push(event.context["state"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(states, ["pending", "processing", "success"]);
}
