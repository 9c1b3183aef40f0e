//! Spin-cycle orchestration
//!
//! [`SlotMachine`] owns the reels and drives one spin cycle at a time:
//! staggered starts, a fixed full-speed spin, staggered stops, then a
//! completion barrier that waits for every reel to settle before the win
//! draw. All timing runs on the deterministic [`Scheduler`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::{EventBus, MachineEvent, TimedEvent};
use super::reel::{Reel, random_belt};
use super::scheduler::Scheduler;
use crate::audio::{SilentPlayer, SoundEffect, SoundPlayer};
use crate::config::MachineConfig;
use crate::consts::FRAME_MS;
use crate::error::ConfigError;

/// RNG stream for the win draw; reel streams follow
const WIN_STREAM: u64 = 0;
const BELT_STREAM: u64 = 1;
const FIRST_REEL_STREAM: u64 = 2;

/// Stagger and duration settings for a cycle (all in ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTiming {
    pub start_stagger_ms: f64,
    pub stop_stagger_ms: f64,
    pub spin_duration_ms: f64,
    pub barrier_timeout_ms: Option<f64>,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            start_stagger_ms: 200.0,
            stop_stagger_ms: 300.0,
            spin_duration_ms: 2000.0,
            barrier_timeout_ms: None,
        }
    }
}

impl SpinTiming {
    /// Delay from cycle start to the stop sequence: the last reel's start
    /// delay plus the full-speed spin.
    pub fn stop_sequence_delay(&self, reel_count: usize) -> f64 {
        reel_count.saturating_sub(1) as f64 * self.start_stagger_ms + self.spin_duration_ms
    }
}

/// Win draw settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinParams {
    /// Probability that a cycle wins
    pub chance: f64,
    /// Multiplier reported with a win
    pub multiplier: f32,
}

impl Default for WinParams {
    fn default() -> Self {
        Self {
            chance: 0.3,
            multiplier: 2.0,
        }
    }
}

/// Collaborators injected into the machine
pub struct MachineServices {
    pub sound: Box<dyn SoundPlayer>,
}

impl Default for MachineServices {
    fn default() -> Self {
        Self {
            sound: Box::new(SilentPlayer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MachineTask {
    StartReel { cycle: u64, index: usize },
    BeginStopSequence { cycle: u64 },
    StopReel { cycle: u64, index: usize },
    BarrierTimeout { cycle: u64 },
}

impl MachineTask {
    fn cycle(&self) -> u64 {
        match *self {
            MachineTask::StartReel { cycle, .. }
            | MachineTask::BeginStopSequence { cycle }
            | MachineTask::StopReel { cycle, .. }
            | MachineTask::BarrierTimeout { cycle } => cycle,
        }
    }
}

/// Token for the single active spin cycle
#[derive(Debug, Clone)]
pub struct SpinCycle {
    pub id: u64,
    pub started_at_ms: f64,
    stops_issued: usize,
    settled: Vec<bool>,
}

impl SpinCycle {
    fn new(id: u64, started_at_ms: f64, reel_count: usize) -> Self {
        Self {
            id,
            started_at_ms,
            stops_issued: 0,
            settled: vec![false; reel_count],
        }
    }

    /// Reels that have not settled yet in this cycle
    pub fn remaining(&self) -> usize {
        self.settled.iter().filter(|settled| !**settled).count()
    }

    pub fn stops_issued(&self) -> usize {
        self.stops_issued
    }

    fn barrier_resolved(&self) -> bool {
        self.stops_issued == self.settled.len() && self.remaining() == 0
    }
}

/// The slot machine: reels plus the spin-cycle controller
pub struct SlotMachine {
    reels: Vec<Reel>,
    timing: SpinTiming,
    win: WinParams,
    scheduler: Scheduler<MachineTask>,
    events: EventBus,
    cycle: Option<SpinCycle>,
    next_cycle_id: u64,
    rng: Pcg32,
    sound: Box<dyn SoundPlayer>,
}

impl SlotMachine {
    /// Validate `config` and build a machine with belts drawn from `seed`
    pub fn new(config: &MachineConfig, seed: u64, services: MachineServices) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = config.symbol_registry()?;
        let params = config.reel_params();

        let mut belt_rng = Pcg32::new(seed, BELT_STREAM);
        let reels = (0..config.reel_count)
            .map(|index| -> Result<Reel, ConfigError> {
                let belt = random_belt(&mut belt_rng, params.symbol_count, &registry)?;
                let rng = Pcg32::new(seed, FIRST_REEL_STREAM + index as u64);
                Ok(Reel::new(index, params, belt, rng).with_origin(config.reel_origin(index)))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        log::info!(
            "Machine built: {} reels x {} symbols, seed {}",
            config.reel_count,
            config.symbols_per_reel,
            seed
        );
        Ok(Self::from_parts(
            reels,
            config.spin_timing(),
            config.win_params(),
            Pcg32::new(seed, WIN_STREAM),
            services,
        ))
    }

    /// Assemble a machine from prebuilt reels.
    ///
    /// Panics on an empty reel list or a win chance outside [0, 1].
    pub fn from_parts(
        reels: Vec<Reel>,
        timing: SpinTiming,
        win: WinParams,
        rng: Pcg32,
        services: MachineServices,
    ) -> Self {
        assert!(!reels.is_empty(), "machine needs at least one reel");
        assert!(
            (0.0..=1.0).contains(&win.chance),
            "win chance {} outside [0, 1]",
            win.chance
        );
        Self {
            reels,
            timing,
            win,
            scheduler: Scheduler::new(),
            events: EventBus::new(),
            cycle: None,
            next_cycle_id: 1,
            rng,
            sound: services.sound,
        }
    }

    /// Convenience constructor seeding the win RNG from a plain seed
    pub fn with_seed(reels: Vec<Reel>, timing: SpinTiming, win: WinParams, seed: u64) -> Self {
        Self::from_parts(reels, timing, win, Pcg32::seed_from_u64(seed), MachineServices::default())
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&Reel> {
        self.reels.get(index)
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }

    pub fn win_params(&self) -> &WinParams {
        &self.win
    }

    pub fn cycle_active(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn cycle(&self) -> Option<&SpinCycle> {
        self.cycle.as_ref()
    }

    /// Scheduler time in ms
    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn all_reels_idle(&self) -> bool {
        self.reels.iter().all(Reel::is_animation_complete)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        self.events.drain()
    }

    /// Begin a spin cycle. Returns false (and does nothing) if one is running.
    pub fn spin(&mut self) -> bool {
        if let Some(cycle) = &self.cycle {
            log::debug!("spin ignored: cycle {} still running", cycle.id);
            return false;
        }

        let now = self.scheduler.now_ms();
        let id = self.next_cycle_id;
        self.next_cycle_id += 1;
        self.cycle = Some(SpinCycle::new(id, now, self.reels.len()));
        log::info!("Spin cycle {} started at {:.1}ms", id, now);

        self.events.emit(now, MachineEvent::SpinStarted);
        self.play(SoundEffect::SpinStart);

        for index in 0..self.reels.len() {
            let delay = index as f64 * self.timing.start_stagger_ms;
            self.scheduler
                .schedule_in(delay, MachineTask::StartReel { cycle: id, index });
        }
        self.scheduler.schedule_in(
            self.timing.stop_sequence_delay(self.reels.len()),
            MachineTask::BeginStopSequence { cycle: id },
        );
        true
    }

    /// Advance the machine by `elapsed_ms`.
    ///
    /// Runs every task that came due (at its exact due time), then moves
    /// each reel by the matching number of frames, then checks the barrier.
    pub fn update(&mut self, elapsed_ms: f64) {
        debug_assert!(!(elapsed_ms < 0.0), "negative elapsed time {elapsed_ms}");
        let elapsed_ms = if elapsed_ms > 0.0 { elapsed_ms } else { 0.0 };
        let until = self.scheduler.now_ms() + elapsed_ms;

        while let Some((at, task)) = self.scheduler.pop_due(until) {
            self.run_task(at, task);
        }
        self.scheduler.advance_to(until);

        let frames = (elapsed_ms / FRAME_MS) as f32;
        for index in 0..self.reels.len() {
            if self.reels[index].update(frames) {
                self.on_reel_settled(index);
            }
        }

        self.resolve_barrier();
    }

    /// Draw the win outcome for a cycle. Emits `WinDetected` on success.
    pub fn check_win(&mut self) -> Option<f32> {
        if !self.rng.random_bool(self.win.chance) {
            return None;
        }
        let multiplier = self.win.multiplier;
        log::info!("Win detected: x{:.2}", multiplier);
        self.events
            .emit(self.scheduler.now_ms(), MachineEvent::WinDetected { multiplier });
        self.play(SoundEffect::Win);
        Some(multiplier)
    }

    fn is_current(&self, cycle: u64) -> bool {
        self.cycle.as_ref().is_some_and(|c| c.id == cycle)
    }

    fn run_task(&mut self, at: f64, task: MachineTask) {
        if !self.is_current(task.cycle()) {
            log::trace!("dropping stale task {:?}", task);
            return;
        }

        match task {
            MachineTask::StartReel { index, .. } => {
                self.reels[index].start_spin();
                self.events.emit(at, MachineEvent::ReelStarted { index });
            }
            MachineTask::BeginStopSequence { cycle } => {
                log::debug!("cycle {} stop sequence at {:.1}ms", cycle, at);
                let count = self.reels.len();
                for index in 0..count {
                    let delay = index as f64 * self.timing.stop_stagger_ms;
                    self.scheduler
                        .schedule_in(delay, MachineTask::StopReel { cycle, index });
                }
                if let Some(timeout) = self.timing.barrier_timeout_ms {
                    let last_stop = count.saturating_sub(1) as f64 * self.timing.stop_stagger_ms;
                    self.scheduler
                        .schedule_in(last_stop + timeout, MachineTask::BarrierTimeout { cycle });
                }
            }
            MachineTask::StopReel { index, .. } => {
                self.reels[index].stop_spin();
                if let Some(cycle) = self.cycle.as_mut() {
                    cycle.stops_issued += 1;
                }
            }
            MachineTask::BarrierTimeout { cycle } => {
                let mut forced = 0;
                for index in 0..self.reels.len() {
                    if self.reels[index].force_settle() {
                        forced += 1;
                        self.on_reel_settled(index);
                    }
                }
                if forced > 0 {
                    log::warn!(
                        "cycle {}: barrier timed out at {:.1}ms, force-settled {} reel(s)",
                        cycle,
                        at,
                        forced
                    );
                }
                self.resolve_barrier();
            }
        }
    }

    fn on_reel_settled(&mut self, index: usize) {
        let Some(cycle) = self.cycle.as_mut() else {
            return;
        };
        if std::mem::replace(&mut cycle.settled[index], true) {
            return;
        }
        let now = self.scheduler.now_ms();
        self.events.emit(now, MachineEvent::ReelStopped { index });
        self.play(SoundEffect::ReelStop { index });
    }

    fn resolve_barrier(&mut self) {
        if !self.cycle.as_ref().is_some_and(SpinCycle::barrier_resolved) {
            return;
        }

        self.check_win();

        if let Some(cycle) = self.cycle.take() {
            let id = cycle.id;
            self.scheduler.cancel_where(|task| task.cycle() == id);
            let now = self.scheduler.now_ms();
            log::info!(
                "Spin cycle {} finished after {:.1}ms",
                id,
                now - cycle.started_at_ms
            );
            self.events.emit(now, MachineEvent::SpinStopped);
        }
    }

    fn play(&mut self, effect: SoundEffect) {
        if let Err(err) = self.sound.play(effect) {
            log::warn!("sound {} failed: {}", effect.as_str(), err);
        }
    }
}
