//! Configuration for gyro-inject
//!
//! Loads an optional TOML file. Every section and key has a default, so an
//! empty file (or no file at all) yields a working configuration that
//! targets a local GyroHook app on port 16384.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "gyro-inject.toml";

/// Top-level application configuration
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Stream target settings
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Target IP address (default: 127.0.0.1)
    #[serde(default = "default_address")]
    pub address: String,

    /// Target TCP port (default: 16384)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Snapshot file settings
#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotConfig {
    /// SharedPreferences document polled by the target app
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,

    /// Value written to the `socket_port` entry (default: 16384)
    #[serde(default = "default_port")]
    pub socket_port: u16,
}

/// Simulation cadence and waveform
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Phase increment per cycle (default: 0.1)
    #[serde(default = "default_step")]
    pub step: f64,

    /// Phase the sawtooth resets to (default: -5.0)
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f64,

    /// Phase above which the sawtooth resets (default: 5.0)
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,

    /// Sleep between samples in milliseconds (default: 100)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Y amplitude, y = amplitude_y * sin(t) (default: 2.0)
    #[serde(default = "default_amplitude_y")]
    pub amplitude_y: f64,

    /// Z amplitude, z = amplitude_z * cos(t) (default: 1.5)
    #[serde(default = "default_amplitude_z")]
    pub amplitude_z: f64,

    /// Stop after this many cycles (default: unbounded)
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

/// Logging configuration
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_address() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    16384
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("/data/user/0/com.example.gyrohook/shared_prefs/gyro_settings.xml")
}
fn default_step() -> f64 {
    0.1
}
fn default_lower_bound() -> f64 {
    -5.0
}
fn default_upper_bound() -> f64 {
    5.0
}
fn default_interval_ms() -> u64 {
    100
}
fn default_amplitude_y() -> f64 {
    2.0
}
fn default_amplitude_z() -> f64 {
    1.5
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            socket_port: default_port(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            lower_bound: default_lower_bound(),
            upper_bound: default_upper_bound(),
            interval_ms: default_interval_ms(),
            amplitude_y: default_amplitude_y(),
            amplitude_z: default_amplitude_z(),
            max_cycles: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SimulationConfig {
    /// Sleep between samples
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject waveforms the sawtooth cannot run
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.step,
            self.lower_bound,
            self.upper_bound,
            self.amplitude_y,
            self.amplitude_z,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("simulation values must be finite".into()));
        }
        if self.step <= 0.0 {
            return Err(Error::Config(format!(
                "simulation.step must be positive, got {}",
                self.step
            )));
        }
        if self.lower_bound >= self.upper_bound {
            return Err(Error::Config(format!(
                "simulation.lower_bound ({}) must be below upper_bound ({})",
                self.lower_bound, self.upper_bound
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.simulation.validate()?;
        Ok(config)
    }

    /// Stream target as `address:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.connection.address, self.connection.port)
    }
}
