//! Fusion engine: gated derivation over the latest-value store.
//!
//! On each tick the engine:
//!
//! 1. Checks the [`PublicationGate`]; if the minimum interval has not
//!    elapsed since the last publication, nothing happens.
//! 2. Takes a snapshot of the required streams. An incomplete snapshot is the
//!    normal warm-up state and is silently retried next tick.
//! 3. Runs the pluggable [`Derive`] function and encodes its output for the
//!    output topic, then advances the gate.
//!
//! The engine has no opinion on the formula; it only enforces completeness
//! and cadence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use sensor_net::{NetError, Outbound, Payload, ScalarReading};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::store::{LatestValueStore, MissingStream, Snapshot};

// ── Publication gate ────────────────────────────────────────────────────────

/// Limits publication to at most once per `minimum_interval`.
#[derive(Debug, Clone)]
pub struct PublicationGate {
    minimum_interval: Duration,
    last_published_at: Option<Instant>,
}

impl PublicationGate {
    /// A gate that has never published, so it is open on the first check.
    #[must_use]
    pub fn new(minimum_interval: Duration) -> Self {
        Self {
            minimum_interval,
            last_published_at: None,
        }
    }

    /// Returns `true` if publishing at `now` respects the minimum interval.
    #[must_use]
    pub fn is_open(&self, now: Instant) -> bool {
        match self.last_published_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.minimum_interval,
        }
    }

    /// Record a publication at `now`.
    pub fn mark_published(&mut self, now: Instant) {
        self.last_published_at = Some(now);
    }

    /// The configured interval.
    #[must_use]
    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    /// When the gate last let a publication through.
    #[must_use]
    pub fn last_published_at(&self) -> Option<Instant> {
        self.last_published_at
    }
}

// ── Derive functions ────────────────────────────────────────────────────────

/// Why a derive function could not produce a result from a snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeriveError {
    /// The snapshot lacks a stream the function reads.
    #[error("stream {0:?} is not in the snapshot")]
    MissingValue(String),

    /// The inputs are outside the function's domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<MissingStream> for DeriveError {
    fn from(missing: MissingStream) -> Self {
        Self::MissingValue(missing.stream_id)
    }
}

/// Turns a complete snapshot into a publishable result.
///
/// `at` is the wall-clock time of computation, not of the readings.
pub trait Derive: Send {
    /// The result type.
    type Output: Payload;

    /// Compute the result.
    ///
    /// # Errors
    ///
    /// Returns [`DeriveError`] if the snapshot cannot be turned into a result;
    /// the tick is skipped and the gate stays where it was.
    fn derive(&mut self, snapshot: &Snapshot, at: DateTime<Local>) -> Result<Self::Output, DeriveError>;
}

impl<F, O> Derive for F
where
    F: FnMut(&Snapshot, DateTime<Local>) -> Result<O, DeriveError> + Send,
    O: Payload,
{
    type Output = O;

    fn derive(&mut self, snapshot: &Snapshot, at: DateTime<Local>) -> Result<O, DeriveError> {
        self(snapshot, at)
    }
}

/// Republishes one stream unchanged.
#[derive(Debug, Clone)]
pub struct Passthrough {
    stream_id: String,
    precision: usize,
}

impl Passthrough {
    /// Pass `stream_id` through, rendered with `precision` decimals.
    #[must_use]
    pub fn new(stream_id: impl Into<String>, precision: usize) -> Self {
        Self {
            stream_id: stream_id.into(),
            precision,
        }
    }
}

impl Derive for Passthrough {
    type Output = ScalarReading;

    fn derive(&mut self, snapshot: &Snapshot, _at: DateTime<Local>) -> Result<ScalarReading, DeriveError> {
        let value = snapshot
            .value(&self.stream_id)
            .ok_or_else(|| DeriveError::MissingValue(self.stream_id.clone()))?;
        Ok(ScalarReading::new(value, self.precision))
    }
}

// ── Engine ──────────────────────────────────────────────────────────────────

/// What a single engine tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum FusionTick {
    /// The minimum interval has not elapsed.
    Gated,
    /// At least one required stream has not reported yet.
    Incomplete(MissingStream),
    /// The derive function rejected the snapshot.
    Skipped(DeriveError),
    /// A result is ready to publish.
    Ready(Outbound),
}

/// Gated, completeness-checked derivation over a [`LatestValueStore`].
pub struct FusionEngine<D> {
    store: Arc<LatestValueStore>,
    required: Vec<String>,
    output_topic: String,
    gate: PublicationGate,
    derive: D,
    /// Set while derive keeps failing; cleared on the next result.
    skipping: bool,
}

impl<D: Derive> FusionEngine<D> {
    /// Create an engine reading `required` streams from `store` and
    /// publishing to `output_topic` at most once per `minimum_interval`.
    #[must_use]
    pub fn new(
        store: Arc<LatestValueStore>,
        required: Vec<String>,
        output_topic: impl Into<String>,
        minimum_interval: Duration,
        derive: D,
    ) -> Self {
        Self {
            store,
            required,
            output_topic: output_topic.into(),
            gate: PublicationGate::new(minimum_interval),
            derive,
            skipping: false,
        }
    }

    /// The streams that must all be present before deriving.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// The topic results are published on.
    #[must_use]
    pub fn output_topic(&self) -> &str {
        &self.output_topic
    }

    /// The publication gate.
    #[must_use]
    pub fn gate(&self) -> &PublicationGate {
        &self.gate
    }

    /// Returns `true` while the derive function is rejecting snapshots.
    #[must_use]
    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    /// Run one tick at monotonic time `now` and wall-clock time `wall`.
    ///
    /// The gate advances only when a result is [`FusionTick::Ready`]. A run
    /// of skipped ticks warns once, then logs at debug until a result is
    /// derived again.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if the derived result cannot be encoded.
    pub fn tick(&mut self, now: Instant, wall: DateTime<Local>) -> Result<FusionTick, NetError> {
        if !self.gate.is_open(now) {
            return Ok(FusionTick::Gated);
        }

        let snapshot = match self.store.snapshot(&self.required) {
            Ok(snapshot) => snapshot,
            Err(missing) => {
                debug!(stream = missing.stream_id, "snapshot incomplete");
                return Ok(FusionTick::Incomplete(missing));
            }
        };

        let output = match self.derive.derive(&snapshot, wall) {
            Ok(output) => output,
            Err(e) => {
                if self.skipping {
                    debug!(error = %e, topic = self.output_topic, "derive still skipped");
                } else {
                    warn!(error = %e, topic = self.output_topic, "derive skipped");
                    self.skipping = true;
                }
                return Ok(FusionTick::Skipped(e));
            }
        };

        let outbound = Outbound::encode(self.output_topic.clone(), &output)?;
        if self.skipping {
            info!(topic = self.output_topic, "derive recovered");
            self.skipping = false;
        }
        self.gate.mark_published(now);
        Ok(FusionTick::Ready(outbound))
    }
}

impl<D> std::fmt::Debug for FusionEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionEngine")
            .field("required", &self.required)
            .field("output_topic", &self.output_topic)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
