//! Per-camera event listener.
//!
//! A listener owns the read loop of one camera connection: bytes are framed
//! into records by [`EventStreamCodec`], records are decoded into
//! [`CameraEvent`]s and the events are pushed into a shared queue.
//!
//! # Cancellation
//!
//! The device keeps the connection open between events, so a read can wait
//! indefinitely. Every wait in the loop (connecting, reading, queueing) is
//! raced against a [`CancellationToken`]; cancelling it ends the loop
//! promptly and drops any partially assembled record.

use camlisten_core::{CameraSettings, Error};
use camlisten_protocol::{CameraEvent, EventStreamCodec, PayloadDecoder, RawRecord};
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{CameraClient, ListenerError};

/// Why a listen loop ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// The cancellation token fired.
    Cancelled,

    /// The camera closed the stream.
    EndOfStream,

    /// Nobody is receiving events any more.
    ReceiverClosed,
}

/// Listener for one camera.
///
/// # Example
///
/// ```no_run
/// use camlisten_core::CameraSettings;
/// use camlisten_network::{CameraClient, CameraClientConfig, CameraListener, CancellationToken};
/// use tokio::sync::mpsc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CameraClient::new(CameraClientConfig::default())?;
/// let camera = CameraSettings::new("gate", "10.0.0.7", "admin", "pw");
/// let listener = CameraListener::new(camera, client);
///
/// let (tx, mut rx) = mpsc::channel(100);
/// let cancel = CancellationToken::new();
/// tokio::spawn(async move { listener.run(&tx, &cancel).await });
///
/// while let Some(event) = rx.recv().await {
///     let event: camlisten_protocol::CameraEvent = event;
///     println!("{event}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CameraListener {
    /// Settings of the camera, as read from configuration.
    settings: CameraSettings,

    /// Client used to open the event stream.
    client: CameraClient,
}

impl CameraListener {
    pub fn new(settings: CameraSettings, client: CameraClient) -> Self {
        Self { settings, client }
    }

    /// Settings of the camera.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Name of the camera, used to label events.
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Connect to the camera and listen until the stream ends.
    ///
    /// # Errors
    ///
    /// Returns connection errors from [`CameraClient::connect`] and read
    /// errors from [`CameraListener::listen`].
    pub async fn run<T>(
        &self,
        events: &mpsc::Sender<T>,
        cancel: &CancellationToken,
    ) -> Result<ListenOutcome, ListenerError>
    where
        T: From<CameraEvent>,
    {
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(ListenOutcome::Cancelled),
            body = self.client.connect(&self.settings) => body?,
        };

        self.listen(body, events, cancel).await
    }

    /// Read records from `reader` and queue the decoded events.
    ///
    /// Records that fail to decode are logged and skipped; the loop carries
    /// on with the next record.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::Io` if reading from `reader` fails.
    pub async fn listen<R, T>(
        &self,
        reader: R,
        events: &mpsc::Sender<T>,
        cancel: &CancellationToken,
    ) -> Result<ListenOutcome, ListenerError>
    where
        R: AsyncRead + Unpin,
        T: From<CameraEvent>,
    {
        let mut records = FramedRead::new(reader, EventStreamCodec::new());
        let mut delivered: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(camera = %self.name(), delivered, "Listener cancelled");
                    return Ok(ListenOutcome::Cancelled);
                }
                next = records.next() => next,
            };

            let record = match next {
                Some(Ok(record)) => record,
                Some(Err(Error::Io(e))) => return Err(ListenerError::Io(e)),
                Some(Err(e)) => return Err(e.into()),
                None => {
                    info!(camera = %self.name(), delivered, "Event stream ended");
                    return Ok(ListenOutcome::EndOfStream);
                }
            };

            let Some(event) = self.decode(&record) else {
                continue;
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(ListenOutcome::Cancelled),
                sent = events.send(T::from(event)) => {
                    if sent.is_err() {
                        debug!(camera = %self.name(), "Event receiver closed");
                        return Ok(ListenOutcome::ReceiverClosed);
                    }
                    delivered += 1;
                }
            }
        }
    }

    /// Decode one record, logging and dropping it on failure.
    fn decode(&self, record: &RawRecord) -> Option<CameraEvent> {
        match PayloadDecoder::decode(self.name(), record.as_str()) {
            Ok(event) => {
                trace!(
                    camera = %self.name(),
                    code = %event.code(),
                    action = %event.action(),
                    index = %event.index(),
                    json = record.has_json_body(),
                    "Event decoded"
                );
                Some(event)
            }
            Err(e) => {
                warn!(camera = %self.name(), error = %e, record = %record, "Dropping record");
                None
            }
        }
    }
}
