//! Unit tests for the controller loop

use super::*;
use crate::test_utils::*;
use crds::WorkflowPhase;
use std::time::Duration;
use tokio::task::JoinHandle;

fn new_controller() -> Arc<Controller> {
    Arc::new(Controller::new(Arc::new(Reconciler::with_yaml_parser())))
}

async fn spawn_running(controller: &Arc<Controller>) -> JoinHandle<Result<(), ControllerError>> {
    let handle = {
        let controller = Arc::clone(controller);
        tokio::spawn(async move { controller.start(CancellationToken::new()).await })
    };
    wait_until("controller to start", || controller.is_running()).await;
    handle
}

fn phase_of(controller: &Controller, name: &str) -> Option<WorkflowPhase> {
    controller.reconciler().get(name, "default").ok().map(|d| d.phase())
}

#[tokio::test]
async fn test_controller_start_stop() {
    let controller = new_controller();
    let handle = spawn_running(&controller).await;

    controller.stop().await.unwrap();
    assert!(!controller.is_running(), "stop returns only after the loop exited");

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("start should return after stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_controller_double_start() {
    let controller = new_controller();
    let _handle = spawn_running(&controller).await;

    let err = controller.start(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ControllerError::AlreadyRunning));
    assert!(controller.is_running(), "failed start leaves the running loop alone");

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn test_controller_stop_not_running() {
    let controller = new_controller();
    let err = controller.stop().await.unwrap_err();
    assert!(matches!(err, ControllerError::NotRunning));
}

#[tokio::test]
async fn test_controller_concurrent_stop_succeeds_once() {
    let controller = new_controller();
    let handle = spawn_running(&controller).await;

    let (first, second) = tokio::join!(controller.stop(), controller.stop());
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results.iter().any(|r| matches!(r, Err(ControllerError::NotRunning))),
        "losing stop reports NotRunning"
    );

    handle.await.unwrap().unwrap();
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_controller_exits_on_caller_cancellation() {
    let controller = new_controller();
    let cancel = CancellationToken::new();
    let handle = {
        let controller = Arc::clone(&controller);
        let cancel = cancel.clone();
        tokio::spawn(async move { controller.start(cancel).await })
    };
    wait_until("controller to start", || controller.is_running()).await;

    cancel.cancel();
    handle.await.unwrap().unwrap();
    assert!(!controller.is_running());
    assert!(matches!(controller.stop().await, Err(ControllerError::NotRunning)));
}

#[tokio::test]
async fn test_controller_dropped_start_future_resets_state() {
    let controller = new_controller();
    let elapsed = tokio::time::timeout(
        Duration::from_millis(20),
        controller.start(CancellationToken::new()),
    )
    .await;
    assert!(elapsed.is_err(), "loop runs until cancelled");
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_controller_process_events() {
    let controller = new_controller();
    let _handle = spawn_running(&controller).await;

    let def = create_test_definition("ctrl-test", "default", 1, VALID_CONFIG);
    assert!(controller.enqueue(ControllerEvent::added(def.clone())));
    wait_until("ADDED to be reconciled", || {
        phase_of(&controller, "ctrl-test") == Some(WorkflowPhase::Running)
    })
    .await;

    let v2 = create_test_definition("ctrl-test", "default", 2, VALID_CONFIG);
    assert!(controller.enqueue(ControllerEvent::modified(v2)));
    wait_until("MODIFIED to be reconciled", || {
        controller
            .reconciler()
            .get("ctrl-test", "default")
            .ok()
            .and_then(|d| d.status)
            .is_some_and(|s| s.observed_version == 2)
    })
    .await;

    assert!(controller.enqueue(ControllerEvent::deleted(def)));
    wait_until("DELETED to be processed", || phase_of(&controller, "ctrl-test").is_none()).await;

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn test_controller_failed_event_does_not_block_others() {
    let controller = new_controller();
    let _handle = spawn_running(&controller).await;

    let bad = create_test_definition("bad-ctrl", "default", 1, INVALID_CONFIG);
    let good = create_test_definition("good-ctrl", "default", 1, VALID_CONFIG);
    let missing = create_test_definition("never-created", "default", 1, VALID_CONFIG);
    controller.enqueue(ControllerEvent::added(bad));
    controller.enqueue(ControllerEvent::deleted(missing));
    controller.enqueue(ControllerEvent::added(good));

    wait_until("good event to be reconciled", || {
        phase_of(&controller, "good-ctrl") == Some(WorkflowPhase::Running)
    })
    .await;
    assert_eq!(phase_of(&controller, "bad-ctrl"), Some(WorkflowPhase::Failed));
    assert!(controller.is_running());

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn test_controller_ignores_unknown_event_type() {
    let controller = new_controller();
    let _handle = spawn_running(&controller).await;

    let def = create_test_definition("bookmarked", "default", 1, VALID_CONFIG);
    let unknown: ControllerEvent = serde_json::from_value(serde_json::json!({
        "type": "BOOKMARK",
        "definition": serde_json::to_value(&def).unwrap(),
    }))
    .unwrap();
    assert_eq!(unknown.event_type, EventType::Unknown);

    controller.enqueue(unknown);
    controller.enqueue(ControllerEvent::added(create_test_definition(
        "after-unknown",
        "default",
        1,
        VALID_CONFIG,
    )));

    wait_until("event after the unknown one", || {
        phase_of(&controller, "after-unknown").is_some()
    })
    .await;
    assert_eq!(phase_of(&controller, "bookmarked"), None);

    controller.stop().await.unwrap();
}

#[tokio::test]
async fn test_controller_processes_in_enqueue_order() {
    let controller = new_controller();
    for version in 1..=3 {
        let def = create_test_definition("ordered", "default", version, VALID_CONFIG);
        controller.enqueue(ControllerEvent::modified(def));
    }
    let short_lived = create_test_definition("short-lived", "default", 1, VALID_CONFIG);
    controller.enqueue(ControllerEvent::added(short_lived.clone()));
    controller.enqueue(ControllerEvent::deleted(short_lived));

    let _handle = spawn_running(&controller).await;
    wait_until("queue to drain", || controller.pending_events() == 0).await;
    controller.stop().await.unwrap();

    let status = controller.reconciler().get("ordered", "default").unwrap().status.unwrap();
    assert_eq!(status.observed_version, 3);
    assert_eq!(phase_of(&controller, "short-lived"), None);
}

#[tokio::test]
async fn test_controller_queue_backpressure() {
    let controller = new_controller();
    let total = DEFAULT_QUEUE_CAPACITY + 44;

    let accepted = (0..total)
        .filter(|i| {
            let def = create_test_definition(&format!("wf-{i}"), "default", 1, VALID_CONFIG);
            controller.enqueue(ControllerEvent::added(def))
        })
        .count();
    assert_eq!(accepted, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(controller.pending_events(), DEFAULT_QUEUE_CAPACITY);

    let _handle = spawn_running(&controller).await;
    wait_until("accepted events to be reconciled", || {
        controller.reconciler().list("default").len() == DEFAULT_QUEUE_CAPACITY
    })
    .await;
    controller.stop().await.unwrap();

    assert!(phase_of(&controller, "wf-0").is_some());
    assert!(phase_of(&controller, &format!("wf-{}", DEFAULT_QUEUE_CAPACITY - 1)).is_some());
    assert!(phase_of(&controller, &format!("wf-{}", total - 1)).is_none(), "newest excess events are dropped");
}

#[tokio::test]
async fn test_controller_stop_halts_reconciliation() {
    let controller = new_controller();
    let _handle = spawn_running(&controller).await;
    controller.stop().await.unwrap();

    let def = create_test_definition("after-stop", "default", 1, VALID_CONFIG);
    assert!(controller.enqueue(ControllerEvent::added(def)));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(phase_of(&controller, "after-stop"), None);
    assert_eq!(controller.pending_events(), 1);
}

#[tokio::test]
async fn test_controller_restart_drains_queue() {
    let controller = new_controller();
    let _first = spawn_running(&controller).await;
    controller.stop().await.unwrap();

    let def = create_test_definition("restarted", "default", 1, VALID_CONFIG);
    controller.enqueue(ControllerEvent::added(def));

    let _second = spawn_running(&controller).await;
    wait_until("queued event after restart", || phase_of(&controller, "restarted").is_some()).await;
    controller.stop().await.unwrap();
}

#[tokio::test]
async fn test_with_capacity_clamps_to_one() {
    let controller = Controller::with_capacity(Arc::new(Reconciler::with_yaml_parser()), 0);
    assert_eq!(controller.capacity(), 1);

    let def = create_test_definition("wf", "default", 1, VALID_CONFIG);
    assert!(controller.enqueue(ControllerEvent::added(def.clone())));
    assert!(!controller.enqueue(ControllerEvent::added(def)));
}
