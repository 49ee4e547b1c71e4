//! Multi-camera monitor.
//!
//! This module provides the `CameraMonitor`, which runs one listener per
//! camera and aggregates their events into a single stream for the
//! application.
//!
//! # Architecture
//!
//! Each camera runs in its own async task and sends events to a shared
//! bounded channel. A task reconnects after its stream ends or fails, until
//! the shared cancellation token fires.
//!
//! ```text
//! ┌──────────┐       ┌─────────────────┐
//! │ Camera A │──────►│                 │
//! │ Task     │       │  Event Channel  │
//! └──────────┘       │  (mpsc)         │──────► MonitorHandle::recv
//!                    │                 │
//! ┌──────────┐       │                 │
//! │ Camera B │──────►│                 │
//! │ Task     │       └─────────────────┘
//! └──────────┘
//! ```
//!
//! # Error Bursts
//!
//! Failures are reported as [`MonitorEvent::Failure`] and counted by an
//! [`ErrorWindow`]. When more than `max_errors` failures land within
//! `error_window` of the first one, the handle cancels every task and the
//! event stream ends.

use camlisten_core::{
    CameraSettings,
    constants::{
        DEFAULT_ERROR_WINDOW, DEFAULT_EVENT_QUEUE_CAPACITY, DEFAULT_MAX_ERRORS,
        DEFAULT_RECONNECT_DELAY,
    },
};
use camlisten_protocol::CameraEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{CameraClient, CameraClientConfig, CameraListener, ListenOutcome, ListenerError};

/// Unified event from any camera task.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MonitorEvent {
    /// Event decoded from a camera stream.
    Camera(CameraEvent),

    /// A camera connection failed.
    ///
    /// The task waits the reconnect delay and tries again.
    Failure {
        /// Name of the camera.
        camera: String,

        /// Error message.
        error: String,
    },
}

impl From<CameraEvent> for MonitorEvent {
    fn from(event: CameraEvent) -> Self {
        MonitorEvent::Camera(event)
    }
}

/// Tuning for the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Wait before reconnecting a camera whose stream ended or failed.
    pub reconnect_delay: Duration,

    /// Capacity of the shared event channel.
    pub queue_capacity: usize,

    /// Failures tolerated within one error window.
    pub max_errors: usize,

    /// Length of the error window, counted from its first failure.
    pub error_window: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            max_errors: DEFAULT_MAX_ERRORS,
            error_window: DEFAULT_ERROR_WINDOW,
        }
    }
}

/// Counter detecting bursts of failures.
///
/// A window opens at the first failure and lasts `window`. A failure after
/// the window has closed starts a new one.
///
/// # Examples
///
/// ```
/// use camlisten_network::ErrorWindow;
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let mut window = ErrorWindow::new(3, Duration::from_secs(5));
/// let start = Instant::now();
///
/// assert!(!window.record(start));
/// assert!(!window.record(start));
/// assert!(!window.record(start));
/// assert!(window.record(start)); // fourth failure within the window
/// ```
#[derive(Debug, Clone)]
pub struct ErrorWindow {
    max_errors: usize,
    window: Duration,
    count: usize,
    closes_at: Option<Instant>,
}

impl ErrorWindow {
    pub fn new(max_errors: usize, window: Duration) -> Self {
        Self {
            max_errors,
            window,
            count: 0,
            closes_at: None,
        }
    }

    /// Record a failure at `now`; returns `true` once the threshold is exceeded.
    pub fn record(&mut self, now: Instant) -> bool {
        if self.closes_at.is_some_and(|closes_at| now > closes_at) {
            self.count = 0;
        }
        if self.count == 0 {
            self.closes_at = Some(now + self.window);
        }
        self.count += 1;
        self.count > self.max_errors
    }

    /// Failures counted in the current window.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Handle for receiving events from camera tasks.
///
/// This handle provides access to the event stream from all registered
/// cameras and owns the tasks producing it.
pub struct MonitorHandle {
    /// Event receiver for consuming events from camera tasks.
    event_rx: mpsc::Receiver<MonitorEvent>,

    /// Running camera tasks.
    tasks: JoinSet<()>,

    /// Token shared by every camera task.
    cancel: CancellationToken,

    /// Failure burst detector.
    errors: ErrorWindow,
}

impl MonitorHandle {
    /// Receive the next event from any camera.
    ///
    /// Failures are passed through after being counted. Returns `None` once
    /// the monitor is cancelled (by the caller or by an error burst) or all
    /// camera tasks have ended.
    pub async fn recv(&mut self) -> Option<MonitorEvent> {
        let event = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            event = self.event_rx.recv() => event?,
        };

        if let MonitorEvent::Failure { camera, error } = &event {
            warn!(camera = %camera, error = %error, "Camera failure");
            if self.errors.record(Instant::now()) {
                error!(
                    failures = self.errors.count(),
                    max_errors = self.errors.max_errors,
                    window_secs = self.errors.window.as_secs(),
                    "Error threshold exceeded, aborting"
                );
                self.cancel.cancel();
            }
        }

        Some(event)
    }

    /// Token shared by every camera task; cancelling it stops the monitor.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the monitor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop all camera tasks and wait for them to end.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.event_rx.close();

        let mut panics = 0;
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result
                && e.is_panic()
            {
                panics += 1;
            }
        }

        if panics > 0 {
            error!(panics, "Camera tasks panicked");
        }
        debug!("Monitor shut down");
    }
}

/// Runs a listener for every registered camera.
///
/// # Lifecycle
///
/// 1. Create monitor with configuration
/// 2. Register cameras using `register`
/// 3. Call `start()` to spawn camera tasks and get event handle
/// 4. Use handle to receive events
/// 5. Call `shutdown()` on the handle
pub struct CameraMonitor {
    /// Registered cameras.
    cameras: Vec<CameraSettings>,

    /// Shared HTTP client.
    client: CameraClient,

    /// Configuration.
    config: MonitorConfig,
}

impl CameraMonitor {
    /// Create a new monitor.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::Client` if the HTTP client cannot be built.
    pub fn new(
        config: MonitorConfig,
        client_config: CameraClientConfig,
    ) -> Result<Self, ListenerError> {
        Ok(Self {
            cameras: Vec::new(),
            client: CameraClient::new(client_config)?,
            config,
        })
    }

    /// Register a camera.
    pub fn register(&mut self, camera: CameraSettings) {
        self.cameras.push(camera);
    }

    /// Registered cameras.
    pub fn cameras(&self) -> &[CameraSettings] {
        &self.cameras
    }

    /// Spawn one task per camera and return the event handle.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(self) -> MonitorHandle {
        let (event_tx, event_rx) = mpsc::channel(self.config.queue_capacity.max(1));
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for camera in self.cameras {
            let listener = CameraListener::new(camera, self.client.clone());
            tasks.spawn(Self::camera_task(
                listener,
                event_tx.clone(),
                cancel.clone(),
                self.config.reconnect_delay,
            ));
        }

        info!(cameras = tasks.len(), "Monitor started");

        MonitorHandle {
            event_rx,
            tasks,
            cancel,
            errors: ErrorWindow::new(self.config.max_errors, self.config.error_window),
        }
    }

    /// Camera task: listen, report failures, wait and reconnect.
    async fn camera_task(
        listener: CameraListener,
        events: mpsc::Sender<MonitorEvent>,
        cancel: CancellationToken,
        reconnect_delay: Duration,
    ) {
        loop {
            match listener.run(&events, &cancel).await {
                Ok(ListenOutcome::Cancelled) | Ok(ListenOutcome::ReceiverClosed) => break,
                Ok(ListenOutcome::EndOfStream) => {
                    info!(camera = %listener.name(), "Stream closed by camera");
                }
                Err(e) => {
                    let failure = MonitorEvent::Failure {
                        camera: listener.name().to_string(),
                        error: e.to_string(),
                    };
                    if events.send(failure).await.is_err() {
                        break;
                    }
                }
            }

            debug!(
                camera = %listener.name(),
                delay_ms = reconnect_delay.as_millis() as u64,
                "Reconnecting after delay"
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {}
            }
        }

        debug!(camera = %listener.name(), "Camera task finished");
    }
}
