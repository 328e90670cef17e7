//! Paddle laser: turns the paddle's pose into seed segments

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ray::Ray2D;
use super::segment::SeedSegment;
use crate::consts::{PADDLE_LASER_BASE_DPS, PADDLE_WIDTH_FLAT_TOP};
use crate::error::Result;

/// Where the paddle is and which way it faces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddlePose {
    pub center: Vec2,
    pub half_height: f32,
    /// Half the width of the paddle's flat top
    pub half_flat_top_width: f32,
    /// Direction the laser fires in
    pub up: Vec2,
    /// Sticky power-up active: the laser fans out into three rays
    pub sticky: bool,
}

impl PaddlePose {
    /// Middle of the paddle's top edge
    pub fn top_center(&self) -> Vec2 {
        self.center + self.up.normalize_or_zero() * self.half_height
    }
}

/// Random fan shape, drawn once per sticky period
#[derive(Debug, Clone, Copy, PartialEq)]
struct StickySpread {
    center_angle: f32,
    left_angle: f32,
    right_angle: f32,
    center_fraction: f32,
    left_fraction: f32,
    right_fraction: f32,
}

impl StickySpread {
    fn random(rng: &mut Pcg32) -> Self {
        let center_angle = rng.random_range(-20.0f32..=20.0).to_radians();
        Self {
            center_angle,
            left_angle: center_angle + rng.random_range(10.0f32..=50.0).to_radians(),
            right_angle: center_angle - rng.random_range(10.0f32..=50.0).to_radians(),
            center_fraction: rng.random_range(0.5..=0.75),
            left_fraction: rng.random_range(0.2..=0.6),
            right_fraction: rng.random_range(0.2..=0.6),
        }
    }
}

/// Produces the paddle laser's seeds every tick
#[derive(Debug, Clone)]
pub struct PaddleLaserEmitter {
    rng: Pcg32,
    sticky: Option<StickySpread>,
}

impl PaddleLaserEmitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            sticky: None,
        }
    }

    /// Damage scales with the current flat-top width
    pub fn base_damage(pose: &PaddlePose) -> i32 {
        let scale = (2.0 * pose.half_flat_top_width / PADDLE_WIDTH_FLAT_TOP).max(0.0);
        (PADDLE_LASER_BASE_DPS as f32 * scale).round() as i32
    }

    pub fn base_radius(pose: &PaddlePose) -> f32 {
        pose.half_flat_top_width * 0.5
    }

    /// Seeds for the current pose carrying the beam's `dps`: one straight
    /// ray, or the sticky fan
    pub fn seeds(&mut self, pose: &PaddlePose, dps: i32) -> Result<Vec<SeedSegment>> {
        let origin = pose.top_center();
        let radius = Self::base_radius(pose);

        if !pose.sticky {
            self.sticky = None;
            return Ok(vec![SeedSegment::new(Ray2D::new(origin, pose.up), radius, dps)?]);
        }

        let rng = &mut self.rng;
        let spread = *self.sticky.get_or_insert_with(|| StickySpread::random(rng));
        let up = Ray2D::new(origin, pose.up);
        let side = pose.half_flat_top_width * 0.5;

        let scaled = |ray: Ray2D, fraction: f32| {
            SeedSegment::new(ray, radius * fraction, (dps as f32 * fraction) as i32)
        };
        let right = Ray2D::new(origin - up.perpendicular() * side, pose.up);
        let left = Ray2D::new(origin + up.perpendicular() * side, pose.up);
        Ok(vec![
            scaled(up.rotated(spread.center_angle), spread.center_fraction)?,
            scaled(right.rotated(spread.right_angle), spread.right_fraction)?,
            scaled(left.rotated(spread.left_angle), spread.left_fraction)?,
        ])
    }

    /// Is a sticky fan currently cached?
    pub fn is_fanned(&self) -> bool {
        self.sticky.is_some()
    }
}
