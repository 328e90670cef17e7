//! Beamsim - laser beam propagation for a 2D brick-breaker level
//!
//! Core modules:
//! - `sim`: Beam segments, nearest-hit collision resolution, lifetime and diffing
//! - `settings`: Data-driven beam tuning
//! - `error`: Construction and configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{BeamError, Result};
pub use settings::BeamSettings;

/// Beam configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f64 = 1.0 / 120.0;

    /// Thinnest segment a split may produce (world units)
    pub const MIN_BEAM_RADIUS: f32 = 0.05;
    /// Weakest damage a split may produce
    pub const MIN_DMG_PER_SEC: i32 = 25;
    /// Shortest finite lifetime; also the length of the fade-out window
    pub const MIN_ALLOWED_LIFETIME: f64 = 0.75;
    /// Lifetime sentinel for beams that only die when removed
    pub const INFINITE_LIFETIME: f64 = f64::INFINITY;

    /// Below this alpha a beam no longer hits the paddle
    pub const PADDLE_COLLISION_ALPHA_CUTOFF: f32 = 0.33;
    /// Length tolerance when diffing segments between rebuilds
    pub const SEGMENT_EPSILON: f32 = 0.001;

    /// Paddle laser defaults
    pub const PADDLE_LASER_LIFETIME: f64 = 10.0;
    pub const PADDLE_LASER_BASE_DPS: i32 = 150;
    /// Width of the paddle's flat top at its default size
    pub const PADDLE_WIDTH_FLAT_TOP: f32 = 3.0;

    /// Number of dips in a segment's radius pulse cycle
    pub const RADIUS_PULSE_CHANGES: usize = 5;
}

/// Linearly interpolate `from -> to` while `t` moves across `[t0, t1]`,
/// holding the end values outside the interval.
#[inline]
pub fn lerp_over_time(t0: f64, t1: f64, from: f32, to: f32, t: f64) -> f32 {
    if t <= t0 {
        return from;
    }
    if t >= t1 {
        return to;
    }
    let frac = ((t - t0) / (t1 - t0)) as f32;
    from + (to - from) * frac
}
