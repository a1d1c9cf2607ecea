use shared::error::EnvelopeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("no active websocket connection")]
    NoConnection,
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error("websocket connection closed")]
    ConnectionClosed,
}
