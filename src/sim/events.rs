//! Machine lifecycle events
//!
//! The machine pushes events onto an [`EventBus`]; the host drains them each
//! frame and forwards them to UI, economy or analytics layers.

use serde::{Deserialize, Serialize};

/// Something the machine wants the outside world to know
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MachineEvent {
    SpinStarted,
    ReelStarted { index: usize },
    ReelStopped { index: usize },
    WinDetected { multiplier: f32 },
    SpinStopped,
}

/// An event stamped with scheduler time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_ms: f64,
    pub event: MachineEvent,
}

/// FIFO queue of pending events
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    pending: Vec<TimedEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at_ms: f64, event: MachineEvent) {
        log::trace!("event {:?} at {:.1}ms", event, at_ms);
        self.pending.push(TimedEvent { at_ms, event });
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[TimedEvent] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
