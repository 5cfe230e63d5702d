//! NATS connection management.
//!
//! Provides a thin wrapper around `async-nats` implementing [`Bus`]. Topics
//! are translated to NATS subjects on the way out and back on the way in.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bus::Bus;
use crate::error::NetError;
use crate::messages::InboundMessage;
use crate::topics;

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// A wrapper around an `async-nats` client.
#[derive(Debug, Clone)]
pub struct NatsConnection {
    /// The underlying NATS client.
    client: async_nats::Client,
    /// Tasks forwarding subscription messages into their sinks.
    deliveries: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl NatsConnection {
    /// Connect to NATS using the URL from the `NATS_URL` environment variable,
    /// falling back to [`DEFAULT_NATS_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect(client_name: &str) -> Result<Self, NetError> {
        let url = std::env::var(NATS_URL_ENV).unwrap_or_else(|_| DEFAULT_NATS_URL.to_string());
        Self::connect_with(&url, client_name).await
    }

    /// Connect to NATS at the specified URL, announcing `client_name`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the server is unreachable or rejects
    /// the handshake.
    pub async fn connect_with(url: &str, client_name: &str) -> Result<Self, NetError> {
        info!(url, client_name, "connecting to NATS");
        let client = async_nats::ConnectOptions::new()
            .name(client_name)
            .connect(url)
            .await?;
        info!("NATS connection established");
        Ok(Self {
            client,
            deliveries: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Returns a reference to the underlying `async-nats` client.
    #[must_use]
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }
}

#[async_trait]
impl Bus for NatsConnection {
    async fn subscribe(
        &self,
        pattern: &str,
        sink: mpsc::Sender<InboundMessage>,
    ) -> Result<(), NetError> {
        let subject = topics::to_subject(pattern)?;
        let mut subscriber = self.client.subscribe(subject.clone()).await?;
        debug!(pattern, subject, "subscribed");

        let pattern = pattern.to_string();
        let handle = tokio::spawn(async move {
            while let Some(message) = subscriber.next().await {
                let inbound = InboundMessage::new(topics::from_subject(message.subject.as_str()), message.payload)
                    .with_subscription(pattern.as_str());
                if sink.send(inbound).await.is_err() {
                    break;
                }
            }
        });
        self.deliveries.lock().push(handle);
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), NetError> {
        let subject = topics::to_subject(topic)?;
        self.client.publish(subject, payload.into()).await?;
        Ok(())
    }

    async fn unsubscribe_all(&self) -> Result<(), NetError> {
        // Dropping a subscriber inside its aborted task unsubscribes it.
        let handles: Vec<_> = self.deliveries.lock().drain(..).collect();
        for handle in &handles {
            handle.abort();
        }
        debug!(count = handles.len(), "subscriptions dropped");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), NetError> {
        self.client
            .flush()
            .await
            .map_err(|e| NetError::Nats(e.to_string()))?;
        info!("NATS connection flushed");
        Ok(())
    }
}
