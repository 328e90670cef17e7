//! Beam tuning
//!
//! Every threshold the beam engine reads, serializable so levels and test
//! harnesses can override the defaults from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BeamError, Result};

/// Beam engine tuning values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSettings {
    /// Thinnest segment a split may produce
    pub min_beam_radius: f32,
    /// Damage floor applied when a split divides damage
    pub min_dmg_per_sec: i32,
    /// Length of the fade-out window (seconds), also the minimum finite lifetime
    pub fade_window: f64,
    /// Alpha below which a fading beam stops hitting the paddle
    pub paddle_alpha_cutoff: f32,
    /// Length tolerance used when diffing rebuilt segments
    pub segment_epsilon: f32,

    // === Cosmetics ===
    /// Animate segment radii (rendering only)
    pub radius_pulse: bool,
    /// Seed for the per-beam pulse RNG
    pub rng_seed: u64,
}

impl Default for BeamSettings {
    fn default() -> Self {
        Self {
            min_beam_radius: MIN_BEAM_RADIUS,
            min_dmg_per_sec: MIN_DMG_PER_SEC,
            fade_window: MIN_ALLOWED_LIFETIME,
            paddle_alpha_cutoff: PADDLE_COLLISION_ALPHA_CUTOFF,
            segment_epsilon: SEGMENT_EPSILON,
            radius_pulse: true,
            rng_seed: 0x5EED_BEA4,
        }
    }
}

impl BeamSettings {
    /// Parse settings from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::debug!("Loaded beam settings: {:?}", settings);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Shortest finite lifetime a beam may be created with
    #[inline]
    pub fn min_allowed_lifetime(&self) -> f64 {
        self.fade_window
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.min_beam_radius.is_finite() && self.min_beam_radius > 0.0) {
            return Err(BeamError::Settings(format!(
                "min_beam_radius must be positive, got {}",
                self.min_beam_radius
            )));
        }
        if self.min_dmg_per_sec < 0 {
            return Err(BeamError::Settings(format!(
                "min_dmg_per_sec must not be negative, got {}",
                self.min_dmg_per_sec
            )));
        }
        if !(self.fade_window.is_finite() && self.fade_window > 0.0) {
            return Err(BeamError::Settings(format!(
                "fade_window must be positive, got {}",
                self.fade_window
            )));
        }
        if !(0.0..=1.0).contains(&self.paddle_alpha_cutoff) {
            return Err(BeamError::Settings(format!(
                "paddle_alpha_cutoff must be within [0, 1], got {}",
                self.paddle_alpha_cutoff
            )));
        }
        if self.segment_epsilon.is_nan() || self.segment_epsilon < 0.0 {
            return Err(BeamError::Settings(format!(
                "segment_epsilon must not be negative, got {}",
                self.segment_epsilon
            )));
        }
        Ok(())
    }
}
