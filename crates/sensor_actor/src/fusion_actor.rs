//! Reusable actor that fuses numeric input streams.
//!
//! Each [`InputBinding`] maps a topic pattern to a stream id. Numeric
//! payloads update the [`LatestValueStore`]; on every tick the
//! [`FusionEngine`] decides whether a derived result is due.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sensor_net::{InboundMessage, StreamReading, codec, topics};
use tracing::{debug, info, warn};

use crate::context::TickContext;
use crate::fusion::{Derive, FusionEngine, FusionTick};
use crate::runner::Actor;
use crate::store::LatestValueStore;

/// Command that forgets every stored reading, so nothing is derived until
/// each required stream reports again. Compared case-insensitively.
pub const RESET_COMMAND: &str = "reset";

/// Maps inbound topics to a stream id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    /// Topic pattern to subscribe to.
    pub pattern: String,
    /// Stream id to store readings under; `None` uses the topic's last level.
    pub stream_id: Option<String>,
}

impl InputBinding {
    /// Bind every topic matching `pattern` to `stream_id`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, stream_id: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            stream_id: Some(stream_id.into()),
        }
    }

    /// Bind every topic matching `pattern` to a stream named after the
    /// topic's last level (`sensoren/+` stores `sensoren/humidity` as
    /// `humidity`).
    #[must_use]
    pub fn by_leaf(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            stream_id: None,
        }
    }

    /// The stream id for `topic`, if this binding matches it.
    #[must_use]
    pub fn stream_for(&self, topic: &str) -> Option<String> {
        if !topics::matches(&self.pattern, topic) {
            return None;
        }
        Some(
            self.stream_id
                .clone()
                .unwrap_or_else(|| topics::leaf(topic).to_string()),
        )
    }
}

/// Actor combining input bindings, a store and a fusion engine.
pub struct FusionActor<D> {
    bindings: Vec<InputBinding>,
    store: Arc<LatestValueStore>,
    engine: FusionEngine<D>,
}

impl<D: Derive> FusionActor<D> {
    /// Create an actor that publishes `derive` results on `output_topic` once
    /// every stream in `required` has reported, at most once per
    /// `minimum_interval`.
    #[must_use]
    pub fn new(
        bindings: Vec<InputBinding>,
        required: Vec<String>,
        output_topic: impl Into<String>,
        minimum_interval: Duration,
        derive: D,
    ) -> Self {
        let store = Arc::new(LatestValueStore::new());
        let engine = FusionEngine::new(
            Arc::clone(&store),
            required,
            output_topic,
            minimum_interval,
            derive,
        );
        Self {
            bindings,
            store,
            engine,
        }
    }

    /// The patterns to subscribe to, in binding order.
    #[must_use]
    pub fn input_patterns(&self) -> Vec<String> {
        self.bindings.iter().map(|b| b.pattern.clone()).collect()
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<LatestValueStore> {
        &self.store
    }

    /// The fusion engine.
    #[must_use]
    pub fn engine(&self) -> &FusionEngine<D> {
        &self.engine
    }
}

impl<D: Derive> Actor for FusionActor<D> {
    fn on_message(&mut self, message: &InboundMessage) {
        let Some(stream_id) = self
            .bindings
            .iter()
            .find_map(|binding| binding.stream_for(&message.topic))
        else {
            debug!(topic = message.topic, "no binding for topic");
            return;
        };

        match codec::parse_reading(&message.payload) {
            Ok(value) => {
                info!(topic = message.topic, stream = stream_id, value, "reading received");
                self.store.update(StreamReading::now(stream_id, value));
            }
            Err(e) => {
                warn!(topic = message.topic, stream = stream_id, error = %e, "discarding malformed payload");
            }
        }
    }

    fn on_command(&mut self, command: &str) {
        if command.eq_ignore_ascii_case(RESET_COMMAND) {
            let streams = self.store.len();
            self.store.clear();
            info!(streams, "store reset");
        } else {
            info!(command, "ignoring unknown command");
        }
    }

    fn on_tick(&mut self, ctx: &mut TickContext) -> Result<()> {
        if let FusionTick::Ready(outbound) = self.engine.tick(ctx.now, ctx.wall)? {
            info!(
                tick = ctx.tick_id,
                topic = outbound.topic,
                payload = %String::from_utf8_lossy(&outbound.payload),
                "publishing derived result"
            );
            ctx.publish(outbound);
        }
        Ok(())
    }
}

impl<D> std::fmt::Debug for FusionActor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionActor")
            .field("bindings", &self.bindings)
            .field("streams", &self.store.len())
            .finish_non_exhaustive()
    }
}
