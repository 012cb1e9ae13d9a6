//! Synthetic gyroscope waveform
//!
//! `x` follows the phase itself, `y = amplitude_y * sin(t)` and
//! `z = amplitude_z * cos(t)`. The phase is a sawtooth: once it passes the
//! upper bound it jumps straight to the lower bound instead of wrapping by
//! the period, so the derivative of the trace is discontinuous at the reset.
//! Consumers that trigger on edges rely on that jump.

use crate::config::SimulationConfig;
use crate::types::Vector3;

/// Stateless sample generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalGenerator {
    pub amplitude_y: f64,
    pub amplitude_z: f64,
}

impl SignalGenerator {
    pub fn new(amplitude_y: f64, amplitude_z: f64) -> Self {
        Self {
            amplitude_y,
            amplitude_z,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.amplitude_y, config.amplitude_z)
    }

    /// Sample at phase `t`
    #[inline]
    pub fn sample(&self, t: f64) -> Vector3 {
        Vector3::new(t, self.amplitude_y * t.sin(), self.amplitude_z * t.cos())
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new(2.0, 1.5)
    }
}

/// Sawtooth phase accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    value: f64,
    step: f64,
    lower: f64,
    upper: f64,
}

impl Phase {
    pub fn new(start: f64, step: f64, lower: f64, upper: f64) -> Self {
        Self {
            value: start,
            step,
            lower,
            upper,
        }
    }

    /// Phase starting at 0 with the configured step and bounds
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(0.0, config.step, config.lower_bound, config.upper_bound)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Step forward and return the new phase
    pub fn advance(&mut self) -> f64 {
        self.value += self.step;
        if self.value > self.upper {
            self.value = self.lower;
        }
        self.value
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::new(0.0, 0.1, -5.0, 5.0)
    }
}
