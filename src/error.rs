use serde::Serialize;
use thiserror::Error;

/// Failures of match construction and terrain queries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Expected negative outcomes of a radar activation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RadarError {
    #[error("radar is recharging, ready in {remaining_ms} ms")]
    OnCooldown {
        #[serde(rename = "remainingMs")]
        remaining_ms: u64,
    },

    #[error("radar is only available to a controlled hider")]
    Unavailable,

    #[error("radar can only be used while the match is active")]
    NotActive,
}
