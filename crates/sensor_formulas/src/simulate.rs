//! Simulated sensor signals.
//!
//! The diurnal curves follow `sin((hour - 6) · π / 12)`: minimum at 00:00,
//! zero crossing at 06:00 and 18:00, maximum at 12:00. Humidity runs the
//! inverse curve of temperature.

use std::f64::consts::PI;

use rand::Rng;

use crate::round_to;

/// Bounds simulated relative humidity is clamped to.
pub const HUMIDITY_RANGE: (f64, f64) = (30.0, 95.0);

/// The daily cycle factor in `[-1, 1]` for a fractional hour of day.
#[must_use]
pub fn diurnal_factor(hour: f64) -> f64 {
    ((hour - 6.0) * PI / 12.0).sin()
}

/// Uniform noise in `[-level, level]`. A zero or non-finite level adds none.
fn noise<R: Rng + ?Sized>(rng: &mut R, level: f64) -> f64 {
    let level = level.abs();
    if level == 0.0 || !level.is_finite() {
        0.0
    } else {
        rng.gen_range(-level..=level)
    }
}

/// Temperature with a daily cycle plus uniform noise, in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiurnalTemperature {
    /// Mean temperature.
    pub base: f64,
    /// Amplitude of the daily swing.
    pub variation: f64,
    /// Half-width of the uniform noise.
    pub noise: f64,
}

impl Default for DiurnalTemperature {
    fn default() -> Self {
        Self {
            base: 20.0,
            variation: 5.0,
            noise: 0.5,
        }
    }
}

impl DiurnalTemperature {
    /// Sample the temperature at `hour`, rounded to two decimals.
    pub fn sample<R: Rng + ?Sized>(&self, hour: f64, rng: &mut R) -> f64 {
        let value = self.base + self.variation * diurnal_factor(hour) + noise(rng, self.noise);
        round_to(value, 2)
    }
}

/// Relative humidity with an inverse daily cycle plus uniform noise, in %.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiurnalHumidity {
    /// Mean humidity.
    pub base: f64,
    /// Amplitude of the daily swing.
    pub variation: f64,
    /// Half-width of the uniform noise.
    pub noise: f64,
}

impl Default for DiurnalHumidity {
    fn default() -> Self {
        Self {
            base: 60.0,
            variation: 15.0,
            noise: 2.0,
        }
    }
}

impl DiurnalHumidity {
    /// Sample the humidity at `hour`, clamped to [`HUMIDITY_RANGE`] and
    /// rounded to one decimal.
    pub fn sample<R: Rng + ?Sized>(&self, hour: f64, rng: &mut R) -> f64 {
        let value = self.base - self.variation * diurnal_factor(hour) + noise(rng, self.noise);
        round_to(value.clamp(HUMIDITY_RANGE.0, HUMIDITY_RANGE.1), 1)
    }
}

/// `sin(counter)` with the counter advancing a fixed step per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineWave {
    counter: f64,
    step: f64,
}

impl Default for SineWave {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl SineWave {
    /// A wave starting at zero that advances `step` radians per sample.
    #[must_use]
    pub fn new(step: f64) -> Self {
        Self { counter: 0.0, step }
    }

    /// Return the current value and advance the counter.
    pub fn next_value(&mut self) -> f64 {
        let value = self.counter.sin();
        self.counter += self.step;
        value
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_diurnal_factor_shape() {
        assert!((diurnal_factor(12.0) - 1.0).abs() < 1e-12);
        assert!((diurnal_factor(0.0) + 1.0).abs() < 1e-12);
        assert!(diurnal_factor(6.0).abs() < 1e-12);
        assert!(diurnal_factor(18.0).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_without_noise() {
        let sim = DiurnalTemperature {
            noise: 0.0,
            ..DiurnalTemperature::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!((sim.sample(12.0, &mut rng) - 25.0).abs() < 1e-9);
        assert!((sim.sample(0.0, &mut rng) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_noise_is_bounded() {
        let sim = DiurnalTemperature::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let t = sim.sample(6.0, &mut rng);
            assert!((19.5..=20.5).contains(&t), "got {t}");
        }
    }

    #[test]
    fn test_non_finite_noise_adds_nothing() {
        let mut rng = StdRng::seed_from_u64(5);
        for level in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let sim = DiurnalTemperature {
                noise: level,
                ..DiurnalTemperature::default()
            };
            assert!((sim.sample(12.0, &mut rng) - 25.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_humidity_is_inverse_and_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let sim = DiurnalHumidity {
            noise: 0.0,
            ..DiurnalHumidity::default()
        };
        assert!((sim.sample(12.0, &mut rng) - 45.0).abs() < 1e-9);
        assert!((sim.sample(0.0, &mut rng) - 75.0).abs() < 1e-9);

        let extreme = DiurnalHumidity {
            base: 90.0,
            variation: 40.0,
            noise: 0.0,
        };
        assert!((extreme.sample(0.0, &mut rng) - 95.0).abs() < 1e-9);
        assert!((extreme.sample(12.0, &mut rng) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_sine_wave_advances() {
        let mut wave = SineWave::default();
        assert!(wave.next_value().abs() < 1e-12);
        assert!((wave.next_value() - 0.1f64.sin()).abs() < 1e-12);
        assert!((wave.next_value() - 0.2f64.sin()).abs() < 1e-12);
    }
}
