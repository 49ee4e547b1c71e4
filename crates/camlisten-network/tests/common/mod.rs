//! Common test utilities for network integration tests.
//!
//! Provides a simulated camera: a local HTTP server that answers every
//! event attach request with a scripted response.
#![allow(dead_code)]

use camlisten_core::CameraSettings;
use camlisten_protocol::EventFrame;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// How the simulated camera answers a request.
#[derive(Debug, Clone)]
pub enum DeviceBehavior {
    /// Send these frames, then close the connection or keep it open.
    Stream {
        frames: Vec<EventFrame>,
        hold_open: bool,
    },

    /// Answer with this status and no body.
    Status(u16),
}

/// Handle on a running simulated camera.
pub struct SimulatedCamera {
    /// Address the camera listens on.
    pub addr: SocketAddr,

    /// Request heads received, in order.
    pub requests: mpsc::UnboundedReceiver<String>,
}

impl SimulatedCamera {
    /// Settings pointing at this camera.
    pub fn settings(&self, name: &str) -> CameraSettings {
        CameraSettings::new(name, self.addr.to_string(), "admin", "secret")
    }
}

/// Start a simulated camera answering every connection the same way.
pub async fn spawn_camera(behavior: DeviceBehavior) -> SimulatedCamera {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_tx, requests) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, behavior.clone(), request_tx.clone()));
        }
    });

    SimulatedCamera { addr, requests }
}

/// Single-line motion record.
pub fn motion_frame(index: u32) -> EventFrame {
    EventFrame::single(format!("Code=VideoMotion;action=Start;index={index}"))
}

/// JSON vehicle record with NUL padding.
pub fn vehicle_frame() -> EventFrame {
    EventFrame::json(
        "Code=SmartMotionVehicle;action=Start;index=0",
        [
            "   \"RegionName\" : [ \"Area1\" ],",
            "   \"object\" : [ { \"Rect\" : [4576,5000,4984,5256], \"VehicleID\" : 13421 } ]",
        ],
    )
    .with_content_length(164)
    .with_trailer(["\0\0\0\0"])
}

async fn serve(mut stream: TcpStream, behavior: DeviceBehavior, requests: mpsc::UnboundedSender<String>) {
    let Some(head) = read_request_head(&mut stream).await else {
        return;
    };
    let _ = requests.send(head);

    match behavior {
        DeviceBehavior::Status(status) => {
            let response = format!(
                "HTTP/1.1 {status} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
        DeviceBehavior::Stream { frames, hold_open } => {
            let head = "HTTP/1.1 200 OK\r\n\
                        Content-Type: multipart/x-mixed-replace; boundary=myboundary\r\n\
                        Connection: close\r\n\r\n";
            if stream.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for frame in frames {
                if stream.write_all(&frame.to_bytes()).await.is_err() {
                    return;
                }
                let _ = stream.flush().await;
            }
            if hold_open {
                // Keep the connection idle like a quiet camera
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    }
}

async fn read_request_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}
