//! What the beam engine needs from the rest of the game
//!
//! The level, the paddle and in-flight projectiles are owned elsewhere. The
//! engine only ever holds their identities and talks to them through these
//! traits, so a piece destroyed between ticks simply stops answering queries.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::beam::{BeamId, BeamKind};
use super::ray::Ray2D;

/// Identity of a level piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// Identity of an in-flight projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// Something that can end a segment and answer with reflected/refracted rays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reflector {
    Piece(PieceId),
    Projectile(ProjectileId),
}

/// Anything a beam can collide with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderId {
    Piece(PieceId),
    Paddle,
    Projectile(ProjectileId),
}

impl From<Reflector> for ColliderId {
    fn from(reflector: Reflector) -> Self {
        match reflector {
            Reflector::Piece(id) => ColliderId::Piece(id),
            Reflector::Projectile(id) => ColliderId::Projectile(id),
        }
    }
}

/// Set of collider identities (ignore lists, per-rebuild "already hit" sets)
pub type ColliderSet = HashSet<ColliderId>;

/// Read-only level queries
pub trait BeamLevel {
    /// Closest piece blocking `ray`, skipping `ignore`, with its hit parameter
    fn nearest_level_piece(&self, ray: &Ray2D, ignore: &ColliderSet) -> Option<(PieceId, f32)>;

    /// Closest projectile blocking `ray`, skipping `ignore`, with its hit parameter
    fn nearest_projectile(&self, ray: &Ray2D, ignore: &ColliderSet)
    -> Option<(ProjectileId, f32)>;

    /// Length of the level's bounding diagonal
    fn max_ray_length(&self) -> f32;

    /// Rays leaving `target` when hit at `hit_point` travelling along
    /// `incoming`. Empty means the target absorbs the beam.
    fn reflection_refraction_rays(
        &self,
        target: Reflector,
        hit_point: Vec2,
        incoming: Vec2,
    ) -> Vec<Ray2D>;

    /// The paired portal of `target`, if it is a portal
    fn sibling_portal(&self, target: Reflector) -> Option<Reflector>;
}

/// What the paddle is told when a beam hits it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleBeamHit {
    pub beam: BeamId,
    pub kind: BeamKind,
    /// Ray of the segment that hit
    pub ray: Ray2D,
    /// Distance along the ray to the paddle
    pub distance: f32,
    pub radius: f32,
    pub damage_per_second: i32,
    pub alpha: f32,
}

/// Paddle queries and side effects
pub trait BeamPaddle {
    /// Ray parameter of the first contact with the paddle, if any
    fn collision_check(&self, ray: &Ray2D) -> Option<f32>;

    /// Apply whatever a beam hit means for the paddle
    fn hit_by_beam(&mut self, hit: &PaddleBeamHit);
}

/// Stand-in for levels without a paddle (menus, boss intros, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaddle;

impl BeamPaddle for NoPaddle {
    fn collision_check(&self, _ray: &Ray2D) -> Option<f32> {
        None
    }

    fn hit_by_beam(&mut self, _hit: &PaddleBeamHit) {}
}
