//! Fusion actors: the comfort processor and the relay.

use std::time::Duration;

use chrono::{DateTime, Local};
use sensor_actor::{Derive, DeriveError, FusionActor, InputBinding, Passthrough, Snapshot};
use sensor_formulas::{dew_point_c, heat_index_c};
use sensor_net::ProcessedRecord;
use sensor_net::messages::TIMESTAMP_FORMAT;

/// Stream id temperature readings are stored under.
pub const TEMPERATURE_STREAM: &str = "temperature";

/// Stream id humidity readings are stored under.
pub const HUMIDITY_STREAM: &str = "humidity";

/// Stream id the relay stores its input under.
pub const RELAY_STREAM: &str = "source";

/// Decimals of relayed values.
pub const RELAY_PRECISION: usize = 6;

/// Derives heat index and dew point from the latest temperature and
/// humidity.
#[derive(Debug, Clone, Default)]
pub struct ComfortDerive;

impl Derive for ComfortDerive {
    type Output = ProcessedRecord;

    fn derive(&mut self, snapshot: &Snapshot, at: DateTime<Local>) -> Result<ProcessedRecord, DeriveError> {
        let temperature = snapshot
            .value(TEMPERATURE_STREAM)
            .ok_or_else(|| DeriveError::MissingValue(TEMPERATURE_STREAM.to_string()))?;
        let humidity = snapshot
            .value(HUMIDITY_STREAM)
            .ok_or_else(|| DeriveError::MissingValue(HUMIDITY_STREAM.to_string()))?;

        let dew_point =
            dew_point_c(temperature, humidity).map_err(|e| DeriveError::InvalidInput(e.to_string()))?;

        Ok(ProcessedRecord {
            temperature,
            humidity,
            heat_index: heat_index_c(temperature, humidity),
            dew_point,
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        })
    }
}

/// The comfort processor: publishes a [`ProcessedRecord`] on `output_topic`
/// at most once per `interval`, once both inputs have reported.
#[must_use]
pub fn comfort_processor(
    temperature_topic: &str,
    humidity_topic: &str,
    output_topic: &str,
    interval: Duration,
) -> FusionActor<ComfortDerive> {
    FusionActor::new(
        vec![
            InputBinding::new(temperature_topic, TEMPERATURE_STREAM),
            InputBinding::new(humidity_topic, HUMIDITY_STREAM),
        ],
        vec![TEMPERATURE_STREAM.to_string(), HUMIDITY_STREAM.to_string()],
        output_topic,
        interval,
        ComfortDerive,
    )
}

/// The relay: republishes the latest value seen on `input_topic` to
/// `output_topic` at most once per `interval`.
#[must_use]
pub fn relay(input_topic: &str, output_topic: &str, interval: Duration) -> FusionActor<Passthrough> {
    FusionActor::new(
        vec![InputBinding::new(input_topic, RELAY_STREAM)],
        vec![RELAY_STREAM.to_string()],
        output_topic,
        interval,
        Passthrough::new(RELAY_STREAM, RELAY_PRECISION),
    )
}
