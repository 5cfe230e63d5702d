//! Thermal comfort formulas.
//!
//! Both functions take a temperature in °C and a relative humidity in %
//! and return °C rounded to one decimal.

use crate::round_to;

/// Heat index above which the full regression replaces the simple estimate.
const REGRESSION_THRESHOLD_F: f64 = 80.0;

/// Magnus coefficients.
const MAGNUS_A: f64 = 17.27;
const MAGNUS_B: f64 = 237.7;

/// Errors for inputs a formula is undefined on.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ComfortError {
    /// Relative humidity must be positive and finite.
    #[error("relative humidity {0}% is not a positive number")]
    HumidityOutOfRange(f64),
}

fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Heat index (feels-like temperature) in °C.
///
/// Uses the simple Steadman estimate, switching to the full Rothfusz
/// regression when that estimate exceeds 80 °F.
#[must_use]
pub fn heat_index_c(temp_c: f64, humidity: f64) -> f64 {
    let t = c_to_f(temp_c);
    let rh = humidity;

    let mut hi = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);

    if hi > REGRESSION_THRESHOLD_F {
        hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
            - 0.224_755_41 * t * rh
            - 6.837_83e-3 * t * t
            - 5.481_717e-2 * rh * rh
            + 1.228_74e-3 * t * t * rh
            + 8.5282e-4 * t * rh * rh
            - 1.99e-6 * t * t * rh * rh;
    }

    round_to(f_to_c(hi), 1)
}

/// Dew point in °C (August–Roche–Magnus approximation).
///
/// # Errors
///
/// Returns [`ComfortError::HumidityOutOfRange`] when the logarithm is
/// undefined. Supersaturated readings above 100 % are accepted.
pub fn dew_point_c(temp_c: f64, humidity: f64) -> Result<f64, ComfortError> {
    if !(humidity > 0.0 && humidity.is_finite()) {
        return Err(ComfortError::HumidityOutOfRange(humidity));
    }
    let gamma = (MAGNUS_A * temp_c) / (MAGNUS_B + temp_c) + (humidity / 100.0).ln();
    Ok(round_to((MAGNUS_B * gamma) / (MAGNUS_A - gamma), 1))
}
