//! Single reel kinematics
//!
//! A reel is a horizontal belt of symbols scrolled by a signed offset.
//! It moves through `Idle -> Spinning -> Decelerating -> Snapping -> Idle`,
//! always finishing on an exact symbol-grid position.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::assets::{SymbolId, SymbolRegistry};
use crate::consts::{MAX_FRAME_DELTA, SNAP_EPSILON, SNAP_FRACTION};
use crate::error::ConfigError;
use crate::wrap;

/// Current phase of a reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReelPhase {
    /// At rest on the grid
    Idle,
    /// Full speed
    Spinning,
    /// Stop requested, speed decaying
    Decelerating,
    /// Easing onto the grid slot chosen when speed dropped below threshold
    Snapping { target: f32 },
}

/// Kinematic parameters shared by every reel of a machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelParams {
    pub symbol_count: usize,
    pub symbol_size: f32,
    /// Scroll distance per frame at full speed
    pub base_speed: f32,
    /// Symmetric speed perturbation as a fraction of `base_speed`
    pub speed_jitter: f32,
    /// Per-frame speed multiplier while decelerating
    pub slowdown_rate: f32,
    pub stop_threshold: f32,
    /// Fraction of the remaining snap distance covered per frame
    pub snap_fraction: f32,
    pub snap_epsilon: f32,
}

impl Default for ReelParams {
    fn default() -> Self {
        Self {
            symbol_count: 6,
            symbol_size: 150.0,
            base_speed: 50.0,
            speed_jitter: 0.05,
            slowdown_rate: 0.95,
            stop_threshold: 5.0,
            snap_fraction: SNAP_FRACTION,
            snap_epsilon: SNAP_EPSILON,
        }
    }
}

/// Convert a frame delta into the amount of motion to integrate.
/// Stalls are capped at [`MAX_FRAME_DELTA`] frames.
#[inline]
pub fn normalize_dt(dt: f32) -> f32 {
    // Also maps NaN to zero
    if dt > 0.0 { dt.min(MAX_FRAME_DELTA) } else { 0.0 }
}

/// Fill a belt with symbols drawn uniformly from the registry.
/// Fails on an empty registry.
pub fn random_belt(
    rng: &mut impl Rng,
    symbol_count: usize,
    registry: &SymbolRegistry,
) -> Result<Vec<SymbolId>, ConfigError> {
    let ids: Vec<SymbolId> = registry.ids().collect();
    if ids.is_empty() {
        return Err(ConfigError::EmptySymbolSet);
    }
    Ok((0..symbol_count)
        .map(|_| ids[rng.random_range(0..ids.len())])
        .collect())
}

/// One belt of symbols
#[derive(Debug, Clone)]
pub struct Reel {
    index: usize,
    params: ReelParams,
    belt: Vec<SymbolId>,
    /// Screen position of the belt origin
    origin: Vec2,
    offset: f32,
    speed: f32,
    phase: ReelPhase,
    stop_requested: bool,
    rng: Pcg32,
}

impl Reel {
    /// Create an idle reel at offset 0.
    ///
    /// Panics if the parameters are not positive or the belt length does not
    /// match `symbol_count`; configs are validated before reels are built.
    pub fn new(index: usize, params: ReelParams, belt: Vec<SymbolId>, rng: Pcg32) -> Self {
        assert!(params.symbol_count > 0, "reel needs at least one symbol");
        assert!(params.symbol_size > 0.0, "symbol size must be positive");
        assert_eq!(belt.len(), params.symbol_count, "belt length mismatch");
        Self {
            index,
            params,
            belt,
            origin: Vec2::ZERO,
            offset: 0.0,
            speed: 0.0,
            phase: ReelPhase::Idle,
            stop_requested: false,
            rng,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> &ReelParams {
        &self.params
    }

    pub fn belt(&self) -> &[SymbolId] {
        &self.belt
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Length of one full belt revolution
    pub fn total_width(&self) -> f32 {
        self.params.symbol_count as f32 * self.params.symbol_size
    }

    /// True once the reel has come to rest on the grid
    pub fn is_animation_complete(&self) -> bool {
        self.phase == ReelPhase::Idle
    }

    /// Start (or restart) spinning at base speed plus a small random jitter
    pub fn start_spin(&mut self) {
        let jitter = if self.params.speed_jitter > 0.0 {
            let j = self.params.speed_jitter;
            self.rng.random_range(-j..=j)
        } else {
            0.0
        };
        self.speed = self.params.base_speed * (1.0 + jitter);
        debug_assert!(self.speed >= 0.0, "negative spin speed {}", self.speed);
        // A restart mid-snap can leave whole belt cycles behind
        self.offset = wrap(self.offset, self.total_width());
        self.phase = ReelPhase::Spinning;
        self.stop_requested = false;
        log::debug!("reel {} spinning at {:.2}", self.index, self.speed);
    }

    /// Ask the reel to stop. Deceleration begins on the next update.
    pub fn stop_spin(&mut self) {
        self.stop_requested = true;
    }

    /// Advance the reel by `dt` frames.
    ///
    /// Returns true on the update in which the reel settles.
    pub fn update(&mut self, dt: f32) -> bool {
        debug_assert!(!(dt < 0.0), "negative frame delta {dt}");
        if self.phase == ReelPhase::Idle {
            return false;
        }
        let t = normalize_dt(dt);

        if self.phase == ReelPhase::Spinning && self.stop_requested {
            self.phase = ReelPhase::Decelerating;
            log::debug!("reel {} decelerating", self.index);
        }

        match self.phase {
            ReelPhase::Idle => false,
            ReelPhase::Spinning => {
                self.offset -= self.speed * t;
                false
            }
            ReelPhase::Decelerating => {
                self.speed *= self.params.slowdown_rate.powf(t);
                self.offset -= self.speed * t;
                if self.speed < self.params.stop_threshold {
                    let target = self.snap_target();
                    log::debug!(
                        "reel {} snapping {:.2} -> {:.2}",
                        self.index,
                        self.offset,
                        target
                    );
                    self.phase = ReelPhase::Snapping { target };
                }
                false
            }
            ReelPhase::Snapping { target } => {
                let remaining = target - self.offset;
                if remaining.abs() < self.params.snap_epsilon {
                    self.settle(target);
                    return true;
                }
                let step = 1.0 - (1.0 - self.params.snap_fraction).powf(t);
                let next = self.offset + remaining * step;
                // Far from the origin the eased step can round away entirely
                if t > 0.0 && next == self.offset {
                    self.settle(target);
                    return true;
                }
                self.offset = next;
                false
            }
        }
    }

    /// Jump straight to the nearest grid slot and go idle.
    ///
    /// Returns false if the reel was already idle.
    pub fn force_settle(&mut self) -> bool {
        if self.phase == ReelPhase::Idle {
            return false;
        }
        let target = match self.phase {
            ReelPhase::Snapping { target } => target,
            _ => self.snap_target(),
        };
        self.settle(target);
        true
    }

    /// Land on `target`, dropping the whole belt cycles travelled so the
    /// offset stays small across spins
    fn settle(&mut self, target: f32) {
        self.offset = wrap(target, self.total_width());
        self.speed = 0.0;
        self.phase = ReelPhase::Idle;
        self.stop_requested = false;
        log::debug!("reel {} settled at {:.2}", self.index, self.offset);
    }

    /// Nearest grid position to the current offset, keeping the belt cycles
    /// already travelled. Never more than half a symbol away.
    pub fn snap_target(&self) -> f32 {
        let total = self.total_width();
        let size = self.params.symbol_size;
        let base = (self.offset / total).floor() * total;
        let slot = ((self.offset - base) / size).round();
        base + slot * size
    }

    /// Wrapped x position of belt symbol `i` (relative to the reel origin)
    pub fn symbol_position(&self, i: usize) -> f32 {
        wrap(i as f32 * self.params.symbol_size + self.offset, self.total_width())
    }

    /// Every belt symbol with its wrapped x position, in belt order
    pub fn symbol_positions(&self) -> impl Iterator<Item = (SymbolId, f32)> + '_ {
        self.belt
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, self.symbol_position(i)))
    }

    /// Screen position of belt symbol `i`
    pub fn symbol_screen_position(&self, i: usize) -> Vec2 {
        self.origin + Vec2::new(self.symbol_position(i), 0.0)
    }

    /// Belt index of the symbol nearest to grid slot `slot` (x = slot * size)
    pub fn belt_index_at_slot(&self, slot: usize) -> usize {
        let size = self.params.symbol_size;
        let i = ((slot as f32 * size - self.offset) / size).round() as i64;
        i.rem_euclid(self.params.symbol_count as i64) as usize
    }

    pub fn symbol_at_slot(&self, slot: usize) -> SymbolId {
        self.belt[self.belt_index_at_slot(slot)]
    }

    /// Symbols occupying the first `window` grid slots, left to right
    pub fn landed_symbols(&self, window: usize) -> Vec<SymbolId> {
        (0..window).map(|slot| self.symbol_at_slot(slot)).collect()
    }
}
