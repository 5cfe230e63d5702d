//! Message types exchanged over the bus.
//!
//! Inbound messages are raw `(topic, payload)` pairs; outbound payloads are
//! rendered through the [`Payload`] trait so single-value streams stay plain
//! decimal strings while composite records travel as JSON.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::codec;
use crate::error::NetError;

/// The wall-clock format used for record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Inbound ─────────────────────────────────────────────────────────────────

/// A message delivered by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The concrete topic the message was published on.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Bytes,
    /// The subscription pattern this copy was delivered through.
    pub subscription: String,
}

impl InboundMessage {
    /// Create a new inbound message, tagged with its own topic as the
    /// subscription.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        let topic = topic.into();
        Self {
            subscription: topic.clone(),
            topic,
            payload: payload.into(),
        }
    }

    /// Tag the message with the subscription pattern that delivered it.
    #[must_use]
    pub fn with_subscription(mut self, pattern: impl Into<String>) -> Self {
        self.subscription = pattern.into();
        self
    }

    /// The payload as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// The most recent value observed on one input stream.
///
/// Readings are immutable; a newer reading on the same stream replaces the
/// old one rather than merging with it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReading {
    /// The stream this reading belongs to (e.g. `"temperature"`).
    pub stream_id: String,
    /// The parsed value.
    pub value: f64,
    /// When the reading was received.
    pub received_at: Instant,
}

impl StreamReading {
    /// Create a reading stamped with the current instant.
    #[must_use]
    pub fn now(stream_id: impl Into<String>, value: f64) -> Self {
        Self {
            stream_id: stream_id.into(),
            value,
            received_at: Instant::now(),
        }
    }
}

// ── Outbound ────────────────────────────────────────────────────────────────

/// Anything that can be published as a bus payload.
pub trait Payload {
    /// Render the payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if the value cannot be encoded.
    fn to_payload(&self) -> Result<Vec<u8>, NetError>;
}

/// A message queued for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Destination topic.
    pub topic: String,
    /// Encoded payload.
    pub payload: Vec<u8>,
}

impl Outbound {
    /// Encode a payload for the given topic.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if the payload cannot be encoded.
    pub fn encode<P: Payload + ?Sized>(topic: impl Into<String>, payload: &P) -> Result<Self, NetError> {
        Ok(Self {
            topic: topic.into(),
            payload: payload.to_payload()?,
        })
    }
}

/// A single numeric value rendered with a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarReading {
    /// The value.
    pub value: f64,
    /// Number of decimals in the rendered payload.
    pub precision: usize,
}

impl ScalarReading {
    /// Create a scalar reading.
    #[must_use]
    pub fn new(value: f64, precision: usize) -> Self {
        Self { value, precision }
    }
}

impl Payload for ScalarReading {
    fn to_payload(&self) -> Result<Vec<u8>, NetError> {
        Ok(codec::format_reading(self.value, self.precision).into_bytes())
    }
}

/// The combined temperature/humidity record published by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Heat index (feels-like temperature) in °C.
    pub heat_index: f64,
    /// Dew point in °C.
    pub dew_point: f64,
    /// Local time of computation, formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
}

impl Payload for ProcessedRecord {
    fn to_payload(&self) -> Result<Vec<u8>, NetError> {
        codec::encode_record(self)
    }
}
