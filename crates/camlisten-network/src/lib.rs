//! Network layer for camlisten
//!
//! This crate connects to cameras over HTTP, runs one listener per camera
//! and fans their events into a single queue.
//!
//! # Components
//!
//! - **CameraClient**: Opens the event attach stream of one camera
//! - **CameraListener**: Turns a camera stream into events until cancelled
//! - **CameraMonitor**: Runs every listener, reconnects and aborts on error bursts
//!
//! # Example
//!
//! ```no_run
//! use camlisten_core::CameraSettings;
//! use camlisten_network::{CameraClientConfig, CameraMonitor, MonitorConfig, MonitorEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut monitor = CameraMonitor::new(MonitorConfig::default(), CameraClientConfig::default())?;
//! monitor.register(CameraSettings::new("driveway", "192.168.1.40", "admin", "secret"));
//!
//! let mut handle = monitor.start();
//! while let Some(event) = handle.recv().await {
//!     if let MonitorEvent::Camera(event) = event {
//!         println!("{event}");
//!     }
//! }
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod listener;
mod monitor;

pub use client::{CameraClient, CameraClientConfig, EventBody};
pub use error::ListenerError;
pub use listener::{CameraListener, ListenOutcome};
pub use monitor::{CameraMonitor, ErrorWindow, MonitorConfig, MonitorEvent, MonitorHandle};
pub use tokio_util::sync::CancellationToken;
