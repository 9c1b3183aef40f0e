//! Error types
//!
//! Configuration errors are rejected before a machine is built. Audio and
//! asset errors come from collaborators and are logged, never propagated
//! into a running spin cycle.

use thiserror::Error;

/// Invalid or unreadable machine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a probability in [0, 1] (got {value})")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must lie in (0, 1) (got {value})")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must lie in [0, 1] (got {value})")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("symbol set is empty")]
    EmptySymbolSet,

    #[error("too many distinct symbols (limit {max})")]
    TooManySymbols { max: usize },
}

/// Sound playback failure
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable")]
    Unavailable,

    #[error("failed to play {effect}: {reason}")]
    Playback { effect: &'static str, reason: String },
}

/// Texture resolution failure
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unknown symbol id {0}")]
    UnknownSymbol(u16),

    #[error("texture for '{name}' failed to load: {reason}")]
    Load { name: String, reason: String },
}
