//! Integration tests for `CameraMonitor` against simulated cameras.

mod common;

use camlisten_network::{
    CameraClientConfig, CameraMonitor, MonitorConfig, MonitorEvent, MonitorHandle,
};
use common::{DeviceBehavior, motion_frame, spawn_camera, vehicle_frame};
use std::collections::HashSet;
use std::time::Duration;

fn create_monitor(config: MonitorConfig) -> CameraMonitor {
    CameraMonitor::new(
        config,
        CameraClientConfig {
            connect_timeout: Duration::from_secs(2),
        },
    )
    .unwrap()
}

fn fast_config() -> MonitorConfig {
    MonitorConfig {
        reconnect_delay: Duration::from_millis(50),
        ..MonitorConfig::default()
    }
}

async fn next_event(handle: &mut MonitorHandle) -> Option<MonitorEvent> {
    tokio::time::timeout(Duration::from_secs(5), handle.recv())
        .await
        .expect("timed out waiting for monitor event")
}

/// Test that events from several cameras arrive on one handle.
#[tokio::test]
async fn test_monitor_fan_in() {
    let front = spawn_camera(DeviceBehavior::Stream {
        frames: vec![motion_frame(0)],
        hold_open: true,
    })
    .await;
    let back = spawn_camera(DeviceBehavior::Stream {
        frames: vec![vehicle_frame()],
        hold_open: true,
    })
    .await;

    let mut monitor = create_monitor(fast_config());
    monitor.register(front.settings("front"));
    monitor.register(back.settings("back"));
    assert_eq!(monitor.cameras().len(), 2);

    let mut handle = monitor.start();
    let mut seen = HashSet::new();
    while seen.len() < 2 {
        match next_event(&mut handle).await {
            Some(MonitorEvent::Camera(event)) => {
                seen.insert(event.camera().to_string());
            }
            other => panic!("unexpected monitor event: {other:?}"),
        }
    }

    assert!(seen.contains("front"));
    assert!(seen.contains("back"));
    handle.shutdown().await;
}

/// Test that a camera closing its stream is reconnected.
#[tokio::test]
async fn test_monitor_reconnects_after_end_of_stream() {
    let mut camera = spawn_camera(DeviceBehavior::Stream {
        frames: vec![motion_frame(0)],
        hold_open: false,
    })
    .await;

    let mut monitor = create_monitor(fast_config());
    monitor.register(camera.settings("gate"));
    let mut handle = monitor.start();

    for _ in 0..3 {
        match next_event(&mut handle).await {
            Some(MonitorEvent::Camera(event)) => assert_eq!(event.camera(), "gate"),
            other => panic!("unexpected monitor event: {other:?}"),
        }
    }
    handle.shutdown().await;

    // One request per delivered event
    let mut requests = 0;
    while camera.requests.try_recv().is_ok() {
        requests += 1;
    }
    assert!(requests >= 3);
}

/// Test that a failing camera is reported and retried.
#[tokio::test]
async fn test_monitor_reports_failures() {
    let camera = spawn_camera(DeviceBehavior::Status(500)).await;

    let mut monitor = create_monitor(MonitorConfig {
        max_errors: 10,
        ..fast_config()
    });
    monitor.register(camera.settings("shed"));
    let mut handle = monitor.start();

    for _ in 0..2 {
        match next_event(&mut handle).await {
            Some(MonitorEvent::Failure { camera, error }) => {
                assert_eq!(camera, "shed");
                assert!(error.contains("500"));
            }
            other => panic!("unexpected monitor event: {other:?}"),
        }
    }

    assert!(!handle.is_cancelled());
    handle.shutdown().await;
}

/// Test that a burst of failures cancels the monitor.
#[tokio::test]
async fn test_monitor_aborts_on_error_burst() {
    let camera = spawn_camera(DeviceBehavior::Status(401)).await;

    let mut monitor = create_monitor(MonitorConfig {
        reconnect_delay: Duration::from_millis(10),
        max_errors: 2,
        error_window: Duration::from_secs(30),
        ..MonitorConfig::default()
    });
    monitor.register(camera.settings("attic"));
    let mut handle = monitor.start();

    let mut failures = 0;
    while let Some(event) = next_event(&mut handle).await {
        assert!(matches!(event, MonitorEvent::Failure { .. }));
        failures += 1;
    }

    // The third failure trips the threshold
    assert_eq!(failures, 3);
    assert!(handle.is_cancelled());
    handle.shutdown().await;
}

/// Test that shutdown stops cameras holding their stream open.
#[tokio::test]
async fn test_monitor_shutdown_with_open_streams() {
    let camera = spawn_camera(DeviceBehavior::Stream {
        frames: Vec::new(),
        hold_open: true,
    })
    .await;

    let mut monitor = create_monitor(fast_config());
    monitor.register(camera.settings("roof"));
    let handle = monitor.start();

    tokio::time::sleep(Duration::from_millis(50)).await;
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown did not complete");
}
