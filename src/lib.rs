//! Slot Reels - reel kinematics and spin-cycle orchestration
//!
//! Core modules:
//! - `sim`: Deterministic simulation (reel state machine, scheduler, spin cycle)
//! - `config`: Machine configuration, presets and validation
//! - `audio`: Sound player collaborator
//! - `assets`: Symbol registry and texture provider collaborator
//! - `renderer`: Draw-list building for the host renderer
//! - `stats`: Session statistics built from machine events

pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod renderer;
pub mod sim;
pub mod stats;

pub use config::{MachineConfig, SpinPreset};
pub use error::{AssetError, AudioError, ConfigError};
pub use sim::{MachineEvent, MachineServices, Reel, ReelPhase, SlotMachine};
pub use stats::SessionStats;

/// Simulation constants
pub mod consts {
    /// Duration of one canonical frame (60 Hz), in milliseconds
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest frame delta a reel will integrate in one update.
    /// Stops a stalled frame from skipping a whole belt revolution.
    pub const MAX_FRAME_DELTA: f32 = 2.0;

    /// Default fraction of the remaining snap distance covered per frame
    pub const SNAP_FRACTION: f32 = 0.2;
    /// Snap distance below which the reel lands exactly on its target
    pub const SNAP_EPSILON: f32 = 0.5;
}

/// Wrap a value into `[0, width)`
#[inline]
pub fn wrap(value: f32, width: f32) -> f32 {
    let wrapped = value.rem_euclid(width);
    // rem_euclid can round up to exactly `width` for tiny negative inputs
    if wrapped >= width { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_positive_and_negative() {
        assert_eq!(wrap(0.0, 900.0), 0.0);
        assert_eq!(wrap(950.0, 900.0), 50.0);
        assert_eq!(wrap(-50.0, 900.0), 850.0);
        assert_eq!(wrap(-900.0, 900.0), 0.0);
    }

    #[test]
    fn test_wrap_tiny_negative_stays_in_range() {
        let w = wrap(-1e-9, 900.0);
        assert!((0.0..900.0).contains(&w));
    }
}
