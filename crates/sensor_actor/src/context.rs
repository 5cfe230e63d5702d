//! Per-tick execution context provided to actors.

use chrono::{DateTime, Local};
use sensor_net::{NetError, Outbound, Payload};
use tokio::time::Instant;

/// Context provided to an actor on each tick.
///
/// Carries tick metadata and collects the messages the actor wants
/// published. The runner publishes them once the tick returns, so a tick
/// never blocks on the transport.
#[derive(Debug)]
pub struct TickContext {
    /// Monotonically increasing tick counter, starting at 1.
    pub tick_id: u64,
    /// Monotonic time of the tick, used for gating.
    pub now: Instant,
    /// Wall-clock time of the tick, used for timestamps and diurnal curves.
    pub wall: DateTime<Local>,
    outbox: Vec<Outbound>,
}

impl TickContext {
    /// Create a new context for a tick.
    #[must_use]
    pub fn new(tick_id: u64, now: Instant, wall: DateTime<Local>) -> Self {
        Self {
            tick_id,
            now,
            wall,
            outbox: Vec::new(),
        }
    }

    /// Queue an already encoded message.
    pub fn publish(&mut self, outbound: Outbound) {
        self.outbox.push(outbound);
    }

    /// Encode and queue a payload for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if the payload cannot be encoded.
    pub fn publish_payload<P: Payload + ?Sized>(&mut self, topic: &str, payload: &P) -> Result<(), NetError> {
        self.outbox.push(Outbound::encode(topic, payload)?);
        Ok(())
    }

    /// Messages queued so far.
    #[must_use]
    pub fn outbox(&self) -> &[Outbound] {
        &self.outbox
    }

    /// Take the queued messages, leaving the outbox empty.
    pub fn take_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }
}
