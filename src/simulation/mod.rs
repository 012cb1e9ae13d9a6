//! Continuous simulation: waveform generator and fixed-cadence driver

pub mod driver;
pub mod generator;

pub use driver::{DriverState, SimulationDriver, SimulationReport, StopReason};
pub use generator::{Phase, SignalGenerator};
