//! Machine configuration
//!
//! Loaded from JSON, validated once, then handed to the simulation as plain
//! parameter structs. Nothing downstream re-checks these values.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::SymbolRegistry;
use crate::consts::{SNAP_EPSILON, SNAP_FRACTION};
use crate::error::ConfigError;
use crate::sim::{ReelParams, SpinTiming, WinParams};

/// Timing presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpinPreset {
    #[default]
    Normal,
    Turbo,
}

impl SpinPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpinPreset::Normal => "Normal",
            SpinPreset::Turbo => "Turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(SpinPreset::Normal),
            "turbo" | "fast" => Some(SpinPreset::Turbo),
            _ => None,
        }
    }

    /// Multiplier applied to staggers and spin duration
    pub fn time_scale(&self) -> f64 {
        match self {
            SpinPreset::Normal => 1.0,
            SpinPreset::Turbo => 0.5,
        }
    }
}

/// Full machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Timing preset the timings below were derived from
    pub preset: SpinPreset,

    // === Layout ===
    pub reel_count: usize,
    pub symbols_per_reel: usize,
    /// Width of one symbol cell along the belt
    pub symbol_size: f32,
    /// Screen position of reel 0's belt origin
    pub reel_origin: Vec2,
    /// Vertical distance between stacked reels
    pub reel_spacing: f32,
    /// Symbol set; belts are filled from these names
    pub symbols: Vec<String>,

    // === Kinematics ===
    /// Scroll distance per frame at full speed
    pub base_spin_speed: f32,
    /// Random speed perturbation as a fraction of base speed (0.05 = +/-5%)
    pub speed_jitter: f32,
    /// Per-frame speed decay while stopping, in (0, 1)
    pub slowdown_rate: f32,
    /// Speed below which a stopping reel starts snapping
    pub stop_threshold: f32,
    /// Fraction of remaining snap distance covered per frame, in (0, 1)
    pub snap_fraction: f32,
    pub snap_epsilon: f32,

    // === Timing (ms) ===
    pub start_stagger_ms: f64,
    pub stop_stagger_ms: f64,
    /// Full-speed spin time after the last reel starts
    pub spin_duration_ms: f64,
    /// Give up waiting for unsettled reels after this long (None = wait forever)
    pub barrier_timeout_ms: Option<f64>,

    // === Win ===
    pub win_chance: f64,
    pub win_multiplier: f32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            preset: SpinPreset::Normal,

            reel_count: 5,
            symbols_per_reel: 6,
            symbol_size: 150.0,
            reel_origin: Vec2::ZERO,
            reel_spacing: 160.0,
            symbols: ["cherry", "lemon", "bell", "bar", "seven", "diamond"]
                .into_iter()
                .map(String::from)
                .collect(),

            base_spin_speed: 50.0,
            speed_jitter: 0.05,
            slowdown_rate: 0.95,
            stop_threshold: 5.0,
            snap_fraction: SNAP_FRACTION,
            snap_epsilon: SNAP_EPSILON,

            start_stagger_ms: 200.0,
            stop_stagger_ms: 300.0,
            spin_duration_ms: 2000.0,
            barrier_timeout_ms: None,

            win_chance: 0.3,
            win_multiplier: 2.0,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // Written so NaN fails too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn open_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { field, value })
    }
}

impl MachineConfig {
    /// Create a config from a timing preset (applies preset timings)
    pub fn from_preset(preset: SpinPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Rescale timings from the normal baseline to `preset`
    pub fn apply_preset(&mut self, preset: SpinPreset) {
        let scale = preset.time_scale() / self.preset.time_scale();
        self.start_stagger_ms *= scale;
        self.stop_stagger_ms *= scale;
        self.spin_duration_ms *= scale;
        self.preset = preset;
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded machine config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("reel_count", self.reel_count as f64)?;
        positive("symbols_per_reel", self.symbols_per_reel as f64)?;
        positive("symbol_size", self.symbol_size as f64)?;
        // Empty or oversized symbol sets
        self.symbol_registry()?;

        positive("base_spin_speed", self.base_spin_speed as f64)?;
        if !(0.0..=1.0).contains(&self.speed_jitter) {
            return Err(ConfigError::FractionOutOfRange {
                field: "speed_jitter",
                value: self.speed_jitter as f64,
            });
        }
        open_unit("slowdown_rate", self.slowdown_rate as f64)?;
        positive("stop_threshold", self.stop_threshold as f64)?;
        open_unit("snap_fraction", self.snap_fraction as f64)?;
        positive("snap_epsilon", self.snap_epsilon as f64)?;

        non_negative("start_stagger_ms", self.start_stagger_ms)?;
        non_negative("stop_stagger_ms", self.stop_stagger_ms)?;
        non_negative("spin_duration_ms", self.spin_duration_ms)?;
        if let Some(timeout) = self.barrier_timeout_ms {
            positive("barrier_timeout_ms", timeout)?;
        }

        if !(0.0..=1.0).contains(&self.win_chance) {
            return Err(ConfigError::ProbabilityOutOfRange {
                field: "win_chance",
                value: self.win_chance,
            });
        }
        positive("win_multiplier", self.win_multiplier as f64)?;
        Ok(())
    }

    pub fn reel_params(&self) -> ReelParams {
        ReelParams {
            symbol_count: self.symbols_per_reel,
            symbol_size: self.symbol_size,
            base_speed: self.base_spin_speed,
            speed_jitter: self.speed_jitter,
            slowdown_rate: self.slowdown_rate,
            stop_threshold: self.stop_threshold,
            snap_fraction: self.snap_fraction,
            snap_epsilon: self.snap_epsilon,
        }
    }

    pub fn spin_timing(&self) -> SpinTiming {
        SpinTiming {
            start_stagger_ms: self.start_stagger_ms,
            stop_stagger_ms: self.stop_stagger_ms,
            spin_duration_ms: self.spin_duration_ms,
            barrier_timeout_ms: self.barrier_timeout_ms,
        }
    }

    pub fn win_params(&self) -> WinParams {
        WinParams {
            chance: self.win_chance,
            multiplier: self.win_multiplier,
        }
    }

    pub fn symbol_registry(&self) -> Result<SymbolRegistry, ConfigError> {
        SymbolRegistry::from_names(self.symbols.iter().cloned())
    }

    /// Screen origin of reel `index`
    pub fn reel_origin(&self, index: usize) -> Vec2 {
        self.reel_origin + Vec2::new(0.0, index as f32 * self.reel_spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MachineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_counts() {
        let config = MachineConfig {
            reel_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "reel_count", .. })
        ));

        let config = MachineConfig {
            symbol_size: -150.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "symbol_size", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_probability() {
        for chance in [-0.1, 1.5, f64::NAN] {
            let config = MachineConfig {
                win_chance: chance,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ProbabilityOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_slowdown_outside_unit_interval() {
        for rate in [0.0, 1.0, 1.2] {
            let config = MachineConfig {
                slowdown_rate: rate,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::RateOutOfRange { field: "slowdown_rate", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_negative_stagger_and_empty_symbols() {
        let config = MachineConfig {
            stop_stagger_ms: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));

        let config = MachineConfig {
            symbols: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptySymbolSet)));
    }

    #[test]
    fn test_rejects_oversized_symbol_set() {
        let config = MachineConfig {
            symbols: (0..=crate::assets::MAX_SYMBOLS).map(|i| format!("sym{i}")).collect(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TooManySymbols { .. })));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = MachineConfig::from_json_str(r#"{ "reel_count": 3, "win_chance": 0.5 }"#)
            .unwrap();
        assert_eq!(config.reel_count, 3);
        assert_eq!(config.win_chance, 0.5);
        assert_eq!(config.symbols_per_reel, 6);
    }

    #[test]
    fn test_invalid_json_value_rejected() {
        let err = MachineConfig::from_json_str(r#"{ "win_chance": 2.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ProbabilityOutOfRange { .. }));
        let err = MachineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_timeout() {
        let config = MachineConfig {
            barrier_timeout_ms: Some(5000.0),
            ..Default::default()
        };
        let json = config.to_json_pretty().unwrap();
        let back = MachineConfig::from_json_str(&json).unwrap();
        assert_eq!(back.barrier_timeout_ms, Some(5000.0));
    }

    #[test]
    fn test_turbo_preset_halves_timings() {
        let turbo = MachineConfig::from_preset(SpinPreset::Turbo);
        let normal = MachineConfig::default();
        assert_eq!(turbo.preset, SpinPreset::Turbo);
        assert_eq!(turbo.start_stagger_ms, normal.start_stagger_ms * 0.5);
        assert_eq!(turbo.spin_duration_ms, normal.spin_duration_ms * 0.5);

        // Switching back restores the baseline
        let mut config = turbo;
        config.apply_preset(SpinPreset::Normal);
        assert_eq!(config.stop_stagger_ms, normal.stop_stagger_ms);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(SpinPreset::from_str("TURBO"), Some(SpinPreset::Turbo));
        assert_eq!(SpinPreset::from_str("normal"), Some(SpinPreset::Normal));
        assert_eq!(SpinPreset::from_str("warp"), None);
    }

    #[test]
    fn test_reel_origins_stack_vertically() {
        let config = MachineConfig::default();
        assert_eq!(config.reel_origin(2), Vec2::new(0.0, 320.0));
    }
}
