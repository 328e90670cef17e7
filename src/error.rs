//! Error types for beamsim

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Beam radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("Beam lifetime {got}s is below the minimum of {min}s")]
    LifetimeTooShort { got: f64, min: f64 },

    #[error("Damage per second must not be negative, got {0}")]
    NegativeDamage(i32),

    #[error("Beam ray has no direction")]
    DegenerateRay,

    #[error("No seed segments supplied")]
    NoSeeds,

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Settings format error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BeamError>;
