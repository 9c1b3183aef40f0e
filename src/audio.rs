//! Sound player collaborator
//!
//! The machine fires sounds and forgets them. A failing player never stalls
//! a spin; the orchestrator logs the error and moves on.

use crate::error::AudioError;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Spin button pressed, reels about to start
    SpinStart,
    /// A single reel settled on the grid
    ReelStop { index: usize },
    /// Win detected at the end of a cycle
    Win,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::SpinStart => "spin_start",
            SoundEffect::ReelStop { .. } => "reel_stop",
            SoundEffect::Win => "win",
        }
    }
}

/// Fire-and-forget sound playback
pub trait SoundPlayer {
    fn play(&mut self, effect: SoundEffect) -> Result<(), AudioError>;
}

/// Player that does nothing (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&mut self, _effect: SoundEffect) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Volume-aware player that logs what it would play
#[derive(Debug, Clone)]
pub struct LogPlayer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for LogPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogPlayer {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl SoundPlayer for LogPlayer {
    fn play(&mut self, effect: SoundEffect) -> Result<(), AudioError> {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return Ok(());
        }
        match effect {
            SoundEffect::ReelStop { index } => {
                log::debug!("sfx {} (reel {}) at volume {:.2}", effect.as_str(), index, vol)
            }
            _ => log::debug!("sfx {} at volume {:.2}", effect.as_str(), vol),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamped() {
        let mut player = LogPlayer::new();
        player.set_master_volume(3.0);
        player.set_sfx_volume(-1.0);
        assert_eq!(player.effective_volume(), 0.0);
        player.set_sfx_volume(0.5);
        assert!((player.effective_volume() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_muted_player_is_silent() {
        let mut player = LogPlayer::new();
        player.set_muted(true);
        assert_eq!(player.effective_volume(), 0.0);
        assert!(player.play(SoundEffect::Win).is_ok());
    }
}
