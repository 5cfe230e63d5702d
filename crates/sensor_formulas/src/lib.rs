//! # sensor_formulas
//!
//! Simulation and derivation formulas for the sensor actors. Nothing here
//! knows about the bus; actors plug these functions into their tick or
//! derive step.
//!
//! - [`comfort`]: heat index and dew point from temperature and humidity.
//! - [`simulate`]: diurnal temperature/humidity curves and a sine wave.

pub mod comfort;
pub mod simulate;

pub use comfort::{ComfortError, dew_point_c, heat_index_c};
pub use simulate::{DiurnalHumidity, DiurnalTemperature, SineWave, diurnal_factor};

/// Round `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
