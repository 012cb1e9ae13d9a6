//! Snapshot file as a delivery target

use super::store;
use crate::delivery::Delivery;
use crate::error::Result;
use crate::types::Vector3;
use log::info;
use std::path::{Path, PathBuf};

/// Writes every delivered sample to one snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotSink {
    path: PathBuf,
    socket_port: u16,
    writes: u64,
}

impl SnapshotSink {
    pub fn new(path: impl Into<PathBuf>, socket_port: u16) -> Self {
        Self {
            path: path.into(),
            socket_port,
            writes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Successful writes so far
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Delivery for SnapshotSink {
    fn deliver(&mut self, sample: Vector3) -> Result<()> {
        store::write(&self.path, sample, self.socket_port)?;
        self.writes += 1;
        Ok(())
    }

    /// Ready when the containing directory exists
    fn is_ready(&self) -> bool {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
            Some(_) => true,
            None => false,
        }
    }

    fn close(&mut self) {
        info!(
            "Snapshot sink {} closed ({} writes)",
            self.path.display(),
            self.writes
        );
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}
