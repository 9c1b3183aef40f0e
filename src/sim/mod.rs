//! Deterministic simulation module
//!
//! All reel motion and spin-cycle timing lives here:
//! - Time only advances when the host calls `update`
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies beyond injected traits

pub mod events;
pub mod machine;
pub mod reel;
pub mod scheduler;

pub use events::{EventBus, MachineEvent, TimedEvent};
pub use machine::{MachineServices, SlotMachine, SpinCycle, SpinTiming, WinParams};
pub use reel::{Reel, ReelParams, ReelPhase, normalize_dt, random_belt};
pub use scheduler::{Scheduler, TaskId};
