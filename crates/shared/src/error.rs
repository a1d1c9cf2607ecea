use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown main content panel: {0:?}")]
    UnknownMainContent(String),
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("command arguments must serialize to a JSON object, got {kind}")]
    ArgsNotObject { kind: &'static str },
    #[error("failed to encode command envelope: {0}")]
    Encode(#[from] serde_json::Error),
}
