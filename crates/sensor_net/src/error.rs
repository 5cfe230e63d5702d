//! Network-layer error types.

/// Errors that can occur during bus operations.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a record to JSON.
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Generic NATS error (flush, drain).
    #[error("NATS error: {0}")]
    Nats(String),

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// A topic or topic pattern does not follow the `/`-separated convention.
    #[error("invalid topic {topic:?}: {reason}")]
    InvalidTopic {
        /// The offending topic.
        topic: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The bus connection has already been torn down.
    #[error("bus is disconnected")]
    Disconnected,
}

/// Errors raised while decoding an inbound payload.
///
/// Every variant names the way the payload was malformed so the caller can
/// report it without guessing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload is empty (or only whitespace).
    #[error("payload is empty")]
    Empty,

    /// The payload is not a decimal number.
    #[error("payload {text:?} is not a decimal number")]
    NotNumeric {
        /// The trimmed payload text.
        text: String,
    },

    /// The payload parsed to NaN or an infinity.
    #[error("payload {text:?} is not a finite number")]
    NonFinite {
        /// The trimmed payload text.
        text: String,
    },

    /// The payload is not a valid JSON record of the expected shape.
    #[error("payload is not a valid record: {0}")]
    Record(#[source] serde_json::Error),
}
