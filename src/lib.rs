//! gyro-inject - Synthetic gyroscope injection client
//!
//! Feeds gyroscope offsets to an app under test through one of two
//! delivery paths:
//!
//! - **Stream**: a TCP connection carrying one `x,y,z\n` record per sample
//! - **Snapshot**: a SharedPreferences XML file the app polls
//!
//! Both implement [`Delivery`], so the [`SimulationDriver`] can pump a
//! generated waveform into either.

pub mod config;
pub mod delivery;
pub mod error;
pub mod signal;
pub mod simulation;
pub mod snapshot;
pub mod streaming;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use delivery::Delivery;
pub use error::{Error, Result};
pub use simulation::{SignalGenerator, SimulationDriver, SimulationReport, StopReason};
pub use snapshot::{Snapshot, SnapshotSink};
pub use streaming::StreamSession;
pub use types::Vector3;
