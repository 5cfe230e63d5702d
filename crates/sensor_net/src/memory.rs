//! In-process bus.
//!
//! [`MemoryBus`] implements [`Bus`] without a server: publications are
//! recorded and delivered to every matching subscription made through the
//! same bus. Used to wire actors together in tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::bus::Bus;
use crate::error::NetError;
use crate::messages::{InboundMessage, Outbound};
use crate::topics;

#[derive(Debug, Default)]
struct State {
    subscriptions: Vec<(String, mpsc::Sender<InboundMessage>)>,
    published: Vec<Outbound>,
    unsubscribe_calls: usize,
    disconnect_calls: usize,
    disconnected: bool,
}

/// A cloneable in-process bus.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    state: Arc<Mutex<State>>,
}

impl MemoryBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a message to every matching subscription, as if a remote
    /// peer had published it. Returns the number of sinks reached.
    pub async fn inject(&self, topic: &str, payload: impl Into<Bytes>) -> usize {
        let payload = payload.into();
        let sinks = self.matching_sinks(topic);
        let mut delivered = 0;
        for (pattern, sink) in sinks {
            if sink
                .send(InboundMessage::new(topic, payload.clone()).with_subscription(pattern))
                .await
                .is_ok()
            {
                delivered += 1;
            }
        }
        delivered
    }

    /// All messages published through this bus, in order.
    #[must_use]
    pub fn published(&self) -> Vec<Outbound> {
        self.state.lock().published.clone()
    }

    /// Messages published on one topic, in order.
    #[must_use]
    pub fn published_on(&self, topic: &str) -> Vec<Outbound> {
        self.state
            .lock()
            .published
            .iter()
            .filter(|out| out.topic == topic)
            .cloned()
            .collect()
    }

    /// The patterns currently subscribed, in subscription order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.state
            .lock()
            .subscriptions
            .iter()
            .map(|(pattern, _)| pattern.clone())
            .collect()
    }

    /// How many times [`Bus::unsubscribe_all`] was called.
    #[must_use]
    pub fn unsubscribe_calls(&self) -> usize {
        self.state.lock().unsubscribe_calls
    }

    /// How many times [`Bus::disconnect`] was called.
    #[must_use]
    pub fn disconnect_calls(&self) -> usize {
        self.state.lock().disconnect_calls
    }

    fn matching_sinks(&self, topic: &str) -> Vec<(String, mpsc::Sender<InboundMessage>)> {
        self.state
            .lock()
            .subscriptions
            .iter()
            .filter(|(pattern, _)| topics::matches(pattern, topic))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Bus for MemoryBus {
    async fn subscribe(
        &self,
        pattern: &str,
        sink: mpsc::Sender<InboundMessage>,
    ) -> Result<(), NetError> {
        topics::validate(pattern)?;
        let mut state = self.state.lock();
        if state.disconnected {
            return Err(NetError::Disconnected);
        }
        state.subscriptions.push((pattern.to_string(), sink));
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), NetError> {
        topics::validate(topic)?;
        {
            let mut state = self.state.lock();
            if state.disconnected {
                return Err(NetError::Disconnected);
            }
            state.published.push(Outbound {
                topic: topic.to_string(),
                payload: payload.clone(),
            });
        }
        // Loopback delivery never blocks the publisher; full sinks miss it.
        let payload = Bytes::from(payload);
        for (pattern, sink) in self.matching_sinks(topic) {
            let _ = sink.try_send(InboundMessage::new(topic, payload.clone()).with_subscription(pattern));
        }
        Ok(())
    }

    async fn unsubscribe_all(&self) -> Result<(), NetError> {
        let mut state = self.state.lock();
        state.unsubscribe_calls += 1;
        state.subscriptions.clear();
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), NetError> {
        let mut state = self.state.lock();
        state.disconnect_calls += 1;
        state.disconnected = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inject_reaches_matching_subscribers() {
        let bus = MemoryBus::new();
        let (tx, mut rx) = mpsc::channel(8);
        bus.subscribe("sensoren/+", tx).await.unwrap();

        assert_eq!(bus.inject("sensoren/temperature", "20.00").await, 1);
        assert_eq!(bus.inject("feedback/processor", "stop").await, 0);

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, "sensoren/temperature");
        assert_eq!(msg.payload, Bytes::from_static(b"20.00"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_is_recorded_and_looped_back() {
        let bus = MemoryBus::new();
        let (tx, mut rx) = mpsc::channel(8);
        bus.subscribe("#", tx).await.unwrap();

        bus.publish("sensoren/humidity", b"61.2".to_vec()).await.unwrap();

        assert_eq!(bus.published_on("sensoren/humidity").len(), 1);
        assert_eq!(rx.recv().await.unwrap().topic, "sensoren/humidity");
    }

    #[tokio::test]
    async fn test_each_copy_names_its_subscription() {
        let bus = MemoryBus::new();
        let (tx, mut rx) = mpsc::channel(8);
        bus.subscribe("sensoren/+", tx.clone()).await.unwrap();
        bus.subscribe("sensoren/#", tx).await.unwrap();

        assert_eq!(bus.inject("sensoren/temperature", "20.00").await, 2);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.topic, "sensoren/temperature");
        assert_eq!(first.subscription, "sensoren/+");
        assert_eq!(second.topic, "sensoren/temperature");
        assert_eq!(second.subscription, "sensoren/#");
    }

    #[tokio::test]
    async fn test_disconnect_rejects_publish() {
        let bus = MemoryBus::new();
        bus.unsubscribe_all().await.unwrap();
        bus.disconnect().await.unwrap();
        assert_eq!(bus.unsubscribe_calls(), 1);
        assert_eq!(bus.disconnect_calls(), 1);
        assert!(matches!(
            bus.publish("sensoren/x", Vec::new()).await,
            Err(NetError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_invalid_pattern_rejected() {
        let bus = MemoryBus::new();
        let (tx, _rx) = mpsc::channel(1);
        assert!(bus.subscribe("sensoren/#/x", tx).await.is_err());
    }
}
