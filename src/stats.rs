//! Session statistics
//!
//! Built from drained machine events, the way a UI or economy layer would
//! consume them.

use serde::{Deserialize, Serialize};

use crate::sim::{MachineEvent, TimedEvent};

/// Running totals for a play session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Cycles started
    pub spins: u64,
    /// Cycles finished
    pub completed: u64,
    pub wins: u64,
    pub reel_stops: u64,
    /// Sum of win multipliers
    pub total_multiplier: f64,
    pub best_multiplier: Option<f32>,
    /// Time of the last completed cycle (ms)
    pub last_spin_end_ms: Option<f64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &TimedEvent) {
        match event.event {
            MachineEvent::SpinStarted => self.spins += 1,
            MachineEvent::ReelStarted { .. } => {}
            MachineEvent::ReelStopped { .. } => self.reel_stops += 1,
            MachineEvent::WinDetected { multiplier } => {
                self.wins += 1;
                self.total_multiplier += multiplier as f64;
                self.best_multiplier = Some(
                    self.best_multiplier
                        .map_or(multiplier, |best| best.max(multiplier)),
                );
            }
            MachineEvent::SpinStopped => {
                self.completed += 1;
                self.last_spin_end_ms = Some(event.at_ms);
            }
        }
    }

    pub fn record_all<'a>(&mut self, events: impl IntoIterator<Item = &'a TimedEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Wins per completed cycle (0 before any cycle finishes)
    pub fn hit_rate(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.wins as f64 / self.completed as f64
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(at_ms: f64, event: MachineEvent) -> TimedEvent {
        TimedEvent { at_ms, event }
    }

    #[test]
    fn test_empty_stats() {
        let stats = SessionStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.best_multiplier, None);
    }

    #[test]
    fn test_record_cycles() {
        let mut stats = SessionStats::new();
        let events = [
            at(0.0, MachineEvent::SpinStarted),
            at(10.0, MachineEvent::ReelStarted { index: 0 }),
            at(900.0, MachineEvent::ReelStopped { index: 0 }),
            at(900.0, MachineEvent::WinDetected { multiplier: 2.0 }),
            at(900.0, MachineEvent::SpinStopped),
            at(1000.0, MachineEvent::SpinStarted),
            at(1900.0, MachineEvent::ReelStopped { index: 0 }),
            at(1900.0, MachineEvent::SpinStopped),
            at(2000.0, MachineEvent::SpinStarted),
            at(2900.0, MachineEvent::WinDetected { multiplier: 5.0 }),
            at(2900.0, MachineEvent::SpinStopped),
        ];
        stats.record_all(&events);

        assert_eq!(stats.spins, 3);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.reel_stops, 2);
        assert_eq!(stats.total_multiplier, 7.0);
        assert_eq!(stats.best_multiplier, Some(5.0));
        assert_eq!(stats.last_spin_end_ms, Some(2900.0));
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = SessionStats::new();
        stats.record(&at(0.0, MachineEvent::SpinStarted));
        let json = stats.to_json_pretty().unwrap();
        let back: SessionStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
