//! Logs every reading it receives.

use anyhow::Result;
use sensor_actor::{Actor, TickContext};
use sensor_net::InboundMessage;
use tracing::info;

/// Prints each data message; publishes nothing.
#[derive(Debug, Default)]
pub struct SubscriberActor {
    received: u64,
}

impl SubscriberActor {
    /// Create a subscriber that has seen no messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data messages seen so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl Actor for SubscriberActor {
    fn on_message(&mut self, message: &InboundMessage) {
        self.received += 1;
        info!(topic = %message.topic, payload = %message.text(), "message received");
    }

    fn on_tick(&mut self, _ctx: &mut TickContext) -> Result<()> {
        Ok(())
    }
}
