//! Socket accessor and frame plumbing around an already-open websocket.

use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use futures::{Sink, SinkExt, Stream, StreamExt};
use shared::{
    domain::{SocketCloseEvent, SocketErrorEvent},
    protocol::InboundMessage,
};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, protocol::CloseFrame, Message};
use tracing::{debug, warn};

use crate::{error::SendError, Broadcast, WEBSOCKET_CATEGORY};

pub trait SocketSink: Send + Sync {
    fn send_text(&self, frame: String) -> Result<(), SendError>;
}

/// Accessor for the currently active connection, if any.
pub trait SocketProvider: Send + Sync {
    fn active_socket(&self) -> Option<Arc<dyn SocketSink>>;
}

/// Holds at most one active connection.
#[derive(Default)]
pub struct SocketSlot {
    active: RwLock<Option<Arc<dyn SocketSink>>>,
}

impl SocketSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `socket` as the active connection and returns the one it replaced.
    pub fn install(&self, socket: Arc<dyn SocketSink>) -> Option<Arc<dyn SocketSink>> {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(socket)
    }

    pub fn clear(&self) -> Option<Arc<dyn SocketSink>> {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_connected(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl SocketProvider for SocketSlot {
    fn active_socket(&self) -> Option<Arc<dyn SocketSink>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Queues text frames for a writer task driven by [`pump_outbound`].
#[derive(Clone)]
pub struct ChannelSocket {
    tx: mpsc::UnboundedSender<Message>,
}

impl ChannelSocket {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SocketSink for ChannelSocket {
    fn send_text(&self, frame: String) -> Result<(), SendError> {
        self.tx
            .send(Message::Text(frame))
            .map_err(|_| SendError::ConnectionClosed)
    }
}

/// Writes queued frames to `sink` until every [`ChannelSocket`] handle is
/// dropped, then closes the sink. Returns the number of frames written.
pub async fn pump_outbound<S>(
    mut rx: mpsc::UnboundedReceiver<Message>,
    mut sink: S,
) -> Result<usize>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let mut written = 0;
    while let Some(frame) = rx.recv().await {
        sink.send(frame)
            .await
            .context("failed to write websocket frame")?;
        written += 1;
    }
    sink.close()
        .await
        .context("failed to close websocket writer")?;
    debug!(written = written, "websocket writer finished");
    Ok(written)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelaySummary {
    pub messages: usize,
    pub dropped: usize,
    pub close: Option<SocketCloseEvent>,
}

/// Relays frames from the read half of a connection into `bus` until the
/// connection closes or fails.
pub async fn relay_inbound<S>(mut stream: S, bus: &Broadcast) -> RelaySummary
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let mut summary = RelaySummary::default();
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match InboundMessage::from_frame(&text) {
                Ok(message) => {
                    bus.on_socket_message(&message.kind, &message.data);
                    summary.messages += 1;
                }
                Err(err) => {
                    bus.console()
                        .error(&format!("invalid inbound message: {err}"), WEBSOCKET_CATEGORY);
                    summary.dropped += 1;
                }
            },
            Ok(Message::Close(frame)) => {
                let event = close_event(frame);
                bus.on_socket_closed(&event);
                summary.close = Some(event);
                return summary;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "websocket receive failed");
                bus.on_socket_error(&SocketErrorEvent::new(err.to_string()));
                let event = SocketCloseEvent::abnormal(err.to_string());
                bus.on_socket_closed(&event);
                summary.close = Some(event);
                return summary;
            }
        }
    }

    let event = SocketCloseEvent::abnormal("connection ended without close frame");
    bus.on_socket_closed(&event);
    summary.close = Some(event);
    summary
}

fn close_event(frame: Option<CloseFrame<'_>>) -> SocketCloseEvent {
    match frame {
        Some(frame) => SocketCloseEvent::clean(u16::from(frame.code), frame.reason.into_owned()),
        None => SocketCloseEvent::clean(SocketCloseEvent::NO_STATUS, ""),
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
