//! Console rendering of monitor events.

use camlisten_network::MonitorEvent;
use camlisten_protocol::CameraEvent;
use std::fmt::Write;

/// Render a monitor event for the console.
///
/// Camera events use the `<camera> <timestamp>: <code> <action>` line; in
/// verbose mode the index and JSON data follow on an indented line.
pub fn render(event: &MonitorEvent, verbose: bool) -> String {
    match event {
        MonitorEvent::Camera(event) => render_camera_event(event, verbose),
        MonitorEvent::Failure { camera, error } => format!("{camera}: {error}"),
        _ => format!("{event:?}"),
    }
}

fn render_camera_event(event: &CameraEvent, verbose: bool) -> String {
    let mut out = event.to_string();
    if verbose {
        let _ = write!(out, "\n    index={}", event.index());
        if let Some(data) = event.data() {
            for line in data.lines() {
                let _ = write!(out, "\n    {line}");
            }
        }
    }
    out
}
