//! Delivery strategy abstraction
//!
//! The target app can receive injected samples two ways: a live TCP stream
//! ([`StreamSession`](crate::streaming::StreamSession)) or a snapshot file it
//! polls ([`SnapshotSink`](crate::snapshot::SnapshotSink)). The simulation
//! driver only sees this trait.

use crate::error::Result;
use crate::types::Vector3;

/// Sink for generated samples
pub trait Delivery {
    /// Deliver one sample.
    ///
    /// A failure leaves the sink's state unchanged; the caller decides
    /// whether to stop.
    fn deliver(&mut self, sample: Vector3) -> Result<()>;

    /// Whether `deliver` can be attempted at all
    fn is_ready(&self) -> bool;

    /// Release any held resource. Must be idempotent.
    fn close(&mut self);

    /// Short label for log lines
    fn describe(&self) -> String;
}

impl<D: Delivery + ?Sized> Delivery for Box<D> {
    fn deliver(&mut self, sample: Vector3) -> Result<()> {
        (**self).deliver(sample)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
