//! The bus capability consumed by actors.
//!
//! A [`Bus`] connects, subscribes by pattern, publishes, and forwards every
//! delivered message into a bounded channel owned by the subscriber. The
//! delivery side runs independently of whoever drains the channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::NetError;
use crate::messages::InboundMessage;

/// Publish/subscribe transport.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Subscribe to a topic pattern (`+` and `#` wildcards allowed).
    ///
    /// Every matching message is sent to `sink` in delivery order. Delivery
    /// stops when the sink is closed.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if the pattern is invalid or the subscription is
    /// rejected by the transport.
    async fn subscribe(
        &self,
        pattern: &str,
        sink: mpsc::Sender<InboundMessage>,
    ) -> Result<(), NetError>;

    /// Publish a payload on a concrete topic.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if the topic is invalid or the transport rejects
    /// the message.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), NetError>;

    /// Drop every subscription made through this handle.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if the transport fails to unsubscribe.
    async fn unsubscribe_all(&self) -> Result<(), NetError>;

    /// Flush outstanding publications and release the connection.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if pending messages could not be flushed.
    async fn disconnect(&self) -> Result<(), NetError>;
}
