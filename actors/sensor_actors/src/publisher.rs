//! Simulated single-value publishers.
//!
//! A [`SimulatedPublisher`] samples a [`Signal`] at most once per interval
//! and publishes it as a fixed-precision decimal string.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local, Timelike};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sensor_actor::{Actor, PublicationGate, TickContext};
use sensor_formulas::{DiurnalHumidity, DiurnalTemperature, SineWave};
use sensor_net::{InboundMessage, ScalarReading};
use tracing::{debug, info};

/// A source of simulated values.
pub trait Signal: Send {
    /// Produce the value for wall-clock time `at`.
    fn sample(&mut self, at: DateTime<Local>) -> f64;
}

/// Fractional hour of day, e.g. `14.5` for 14:30.
#[must_use]
pub fn hour_of_day(at: DateTime<Local>) -> f64 {
    f64::from(at.hour()) + f64::from(at.minute()) / 60.0
}

/// Diurnal temperature with uniform noise.
#[derive(Debug)]
pub struct TemperatureSignal {
    model: DiurnalTemperature,
    rng: StdRng,
}

impl TemperatureSignal {
    /// Sample `model` with an entropy-seeded generator.
    #[must_use]
    pub fn new(model: DiurnalTemperature) -> Self {
        Self::with_rng(model, StdRng::from_entropy())
    }

    /// Sample `model` with the given generator.
    #[must_use]
    pub fn with_rng(model: DiurnalTemperature, rng: StdRng) -> Self {
        Self { model, rng }
    }
}

impl Signal for TemperatureSignal {
    fn sample(&mut self, at: DateTime<Local>) -> f64 {
        self.model.sample(hour_of_day(at), &mut self.rng)
    }
}

/// Diurnal humidity with uniform noise, clamped to a plausible range.
#[derive(Debug)]
pub struct HumiditySignal {
    model: DiurnalHumidity,
    rng: StdRng,
}

impl HumiditySignal {
    /// Sample `model` with an entropy-seeded generator.
    #[must_use]
    pub fn new(model: DiurnalHumidity) -> Self {
        Self::with_rng(model, StdRng::from_entropy())
    }

    /// Sample `model` with the given generator.
    #[must_use]
    pub fn with_rng(model: DiurnalHumidity, rng: StdRng) -> Self {
        Self { model, rng }
    }
}

impl Signal for HumiditySignal {
    fn sample(&mut self, at: DateTime<Local>) -> f64 {
        self.model.sample(hour_of_day(at), &mut self.rng)
    }
}

impl Signal for SineWave {
    fn sample(&mut self, _at: DateTime<Local>) -> f64 {
        self.next_value()
    }
}

/// Publishes one signal on one topic.
#[derive(Debug)]
pub struct SimulatedPublisher<S> {
    topic: String,
    precision: usize,
    unit: &'static str,
    gate: PublicationGate,
    signal: S,
}

impl<S: Signal> SimulatedPublisher<S> {
    /// Publish `signal` on `topic` every `interval` with `precision` decimals.
    #[must_use]
    pub fn new(topic: impl Into<String>, interval: Duration, precision: usize, signal: S) -> Self {
        Self {
            topic: topic.into(),
            precision,
            unit: "",
            gate: PublicationGate::new(interval),
            signal,
        }
    }

    /// Unit suffix used in log lines only.
    #[must_use]
    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// The topic values are published on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<S: Signal> Actor for SimulatedPublisher<S> {
    fn on_message(&mut self, message: &InboundMessage) {
        debug!(topic = message.topic, "publisher ignores data messages");
    }

    fn on_tick(&mut self, ctx: &mut TickContext) -> Result<()> {
        if !self.gate.is_open(ctx.now) {
            return Ok(());
        }

        let reading = ScalarReading::new(self.signal.sample(ctx.wall), self.precision);
        ctx.publish_payload(&self.topic, &reading)?;
        self.gate.mark_published(ctx.now);

        info!(
            topic = self.topic,
            value = %sensor_net::format_reading(reading.value, reading.precision),
            unit = self.unit,
            at = %ctx.wall.format("%H:%M:%S"),
            "published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tokio::time::Instant;

    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_hour_of_day() {
        let at = Local.with_ymd_and_hms(2026, 10, 18, 14, 30, 0).unwrap();
        assert!((hour_of_day(at) - 14.5).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_publisher_format() {
        let signal = TemperatureSignal::with_rng(
            DiurnalTemperature {
                noise: 0.0,
                ..DiurnalTemperature::default()
            },
            StdRng::seed_from_u64(0),
        );
        let mut publisher =
            SimulatedPublisher::new("sensoren/temperature", Duration::from_secs(1), 2, signal);

        let mut ctx = TickContext::new(1, Instant::now(), noon());
        publisher.on_tick(&mut ctx).unwrap();

        assert_eq!(ctx.outbox().len(), 1);
        assert_eq!(ctx.outbox()[0].topic, "sensoren/temperature");
        assert_eq!(ctx.outbox()[0].payload, b"25.00");
    }

    #[test]
    fn test_humidity_publisher_format() {
        let signal = HumiditySignal::with_rng(
            DiurnalHumidity {
                noise: 0.0,
                ..DiurnalHumidity::default()
            },
            StdRng::seed_from_u64(0),
        );
        let mut publisher =
            SimulatedPublisher::new("sensoren/humidity", Duration::from_secs(1), 1, signal);

        let mut ctx = TickContext::new(1, Instant::now(), noon());
        publisher.on_tick(&mut ctx).unwrap();
        assert_eq!(ctx.outbox()[0].payload, b"45.0");
    }

    #[test]
    fn test_publisher_respects_interval() {
        let mut publisher = SimulatedPublisher::new(
            "sensoren/python1",
            Duration::from_secs(1),
            6,
            SineWave::default(),
        );
        let start = Instant::now();
        let mut payloads = Vec::new();
        for step in 0..25u64 {
            let mut ctx = TickContext::new(step + 1, start + Duration::from_millis(step * 100), noon());
            publisher.on_tick(&mut ctx).unwrap();
            payloads.extend(ctx.take_outbox().into_iter().map(|o| o.payload));
        }

        assert_eq!(
            payloads,
            vec![b"0.000000".to_vec(), b"0.099833".to_vec(), b"0.198669".to_vec()]
        );
    }
}
