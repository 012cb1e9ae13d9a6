//! Snapshot file delivery
//!
//! The target app polls a SharedPreferences XML file for the injected
//! offsets. Only the latest sample is kept; each write replaces the whole
//! document.

pub mod document;
pub mod sink;
pub mod store;

pub use sink::SnapshotSink;
pub use store::{read, write};

use crate::types::Vector3;
use std::fmt;

/// Contents of one snapshot document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub vector: Vector3,
    pub socket_port: u16,
}

impl Snapshot {
    pub fn new(vector: Vector3, socket_port: u16) -> Self {
        Self {
            vector,
            socket_port,
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={}, y={}, z={}, socket_port={}",
            self.vector.x, self.vector.y, self.vector.z, self.socket_port
        )
    }
}
