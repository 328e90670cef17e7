//! Deterministic beam simulation
//!
//! All beam logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, then segment build order)
//! - No rendering or platform dependencies

pub mod arena;
pub mod beam;
pub mod collider;
pub mod collision;
pub mod emitter;
pub mod events;
pub mod manager;
pub mod ray;
pub mod segment;
pub mod world;

pub use arena::{Arena, ArenaPaddle, Piece, PieceKind, Projectile, ProjectileKind};
pub use beam::{Beam, BeamContact, BeamId, BeamKind, BeamPhase, RebuildOutcome};
pub use collider::{ColliderStrategy, fire_segment_into_level};
pub use collision::{
    ray_aabb_intersection, ray_circle_intersection, ray_segment_intersection, reflect,
};
pub use emitter::{PaddleLaserEmitter, PaddlePose};
pub use events::{BeamEvent, SegmentSnapshot};
pub use manager::BeamManager;
pub use ray::Ray2D;
pub use segment::{BeamSegment, RadiusPulse, SeedSegment, SegmentId};
pub use world::{
    BeamLevel, BeamPaddle, ColliderId, ColliderSet, NoPaddle, PaddleBeamHit, PieceId,
    ProjectileId, Reflector,
};
