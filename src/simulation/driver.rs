//! Simulation driver: feeds generated samples to a delivery on a fixed
//! cadence.
//!
//! ## State Machine
//!
//! ```text
//! Idle ──run()──► Running ──(delivery failed | interrupted | cycle limit)──► Stopped
//!   │
//!   └── delivery not ready: error, stays Idle
//! ```
//!
//! Each cycle advances the phase, generates a sample, delivers it and then
//! sleeps for the interval. The sleep is the only suspension point; the
//! shared `running` flag is checked before every cycle, so an interruption
//! is seen within one interval. The delivery is closed exactly once when
//! the driver stops, on every exit path (including unwinding).

use super::generator::{Phase, SignalGenerator};
use crate::config::SimulationConfig;
use crate::delivery::Delivery;
use crate::error::{Error, Result};
use log::{debug, error, info, warn};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A delivery returned an error
    DeliveryFailed,
    /// The running flag was cleared
    Interrupted,
    /// `max_cycles` reached
    CycleLimit,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationReport {
    /// Cycles that attempted a delivery
    pub cycles: u64,
    /// Deliveries that succeeded
    pub delivered: u64,
    pub reason: StopReason,
    /// Phase of the last generated sample
    pub last_phase: f64,
}

/// Closes the delivery when dropped
struct CloseOnDrop<'a, D: Delivery + ?Sized>(&'a mut D);

impl<D: Delivery + ?Sized> Deref for CloseOnDrop<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &*self.0
    }
}

impl<D: Delivery + ?Sized> DerefMut for CloseOnDrop<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut *self.0
    }
}

impl<D: Delivery + ?Sized> Drop for CloseOnDrop<'_, D> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Fixed-cadence sample pump
pub struct SimulationDriver {
    generator: SignalGenerator,
    phase: Phase,
    interval: Duration,
    max_cycles: Option<u64>,
    running: Arc<AtomicBool>,
    state: DriverState,
}

impl SimulationDriver {
    /// Create an idle driver. Clearing `running` stops a run in progress.
    pub fn new(config: &SimulationConfig, running: Arc<AtomicBool>) -> Self {
        Self {
            generator: SignalGenerator::from_config(config),
            phase: Phase::from_config(config),
            interval: config.interval(),
            max_cycles: config.max_cycles,
            running,
            state: DriverState::Idle,
        }
    }

    /// Override the cycle limit from the configuration
    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Start the phase somewhere other than 0
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Run until the delivery fails, the running flag is cleared or the
    /// cycle limit is reached.
    ///
    /// Fails with [`Error::NotConnected`] without delivering anything if
    /// the delivery is not ready. A driver runs at most once.
    pub fn run<D: Delivery + ?Sized>(&mut self, delivery: &mut D) -> Result<SimulationReport> {
        if self.state != DriverState::Idle {
            return Err(Error::Other(format!(
                "simulation driver cannot run from state {:?}",
                self.state
            )));
        }
        if !delivery.is_ready() {
            error!(
                "Cannot start simulation: {} is not ready",
                delivery.describe()
            );
            return Err(Error::NotConnected);
        }

        let mut delivery = CloseOnDrop(delivery);
        self.state = DriverState::Running;
        info!(
            "Simulation started on {} (interval {:?}, limit {:?})",
            delivery.describe(),
            self.interval,
            self.max_cycles
        );

        let mut cycles = 0u64;
        let mut delivered = 0u64;
        let reason = loop {
            if !self.running.load(Ordering::Relaxed) {
                break StopReason::Interrupted;
            }
            if let Some(max) = self.max_cycles
                && cycles >= max
            {
                break StopReason::CycleLimit;
            }

            let t = self.phase.advance();
            let sample = self.generator.sample(t);
            cycles += 1;

            if let Err(e) = delivery.deliver(sample) {
                warn!("Stopping simulation after cycle {}: {}", cycles, e);
                break StopReason::DeliveryFailed;
            }
            delivered += 1;
            debug!(
                "Cycle {}: X={:.4}, Y={:.4}, Z={:.4}",
                cycles, sample.x, sample.y, sample.z
            );

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        };

        drop(delivery);
        self.state = DriverState::Stopped;

        let report = SimulationReport {
            cycles,
            delivered,
            reason,
            last_phase: self.phase.value(),
        };
        info!(
            "Simulation stopped ({:?}): {} cycles, {} delivered",
            report.reason, report.cycles, report.delivered
        );
        Ok(report)
    }
}
