//! Reference level and paddle
//!
//! A small self-contained world: line-segment pieces, circular projectiles
//! and an axis-aligned paddle box. Good enough to drive the engine in tests
//! and in the demo binary; a real game implements the traits on its own types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    ray_aabb_intersection, ray_circle_intersection, ray_segment_intersection, reflect,
};
use super::emitter::PaddlePose;
use super::ray::Ray2D;
use super::world::{
    BeamLevel, BeamPaddle, ColliderId, ColliderSet, PaddleBeamHit, PieceId, ProjectileId,
    Reflector,
};

/// How a piece treats a beam that hits it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PieceKind {
    /// Absorbs the beam
    Solid,
    /// Reflects the beam
    Mirror,
    /// Lets the beam continue unchanged
    Glass,
    /// Splits the beam into `rays` directions spread over `spread` radians
    Prism { rays: u8, spread: f32 },
    /// Sends the beam out of the paired portal
    Portal { sibling: PieceId },
}

/// A line-segment level piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub a: Vec2,
    pub b: Vec2,
}

impl Piece {
    pub fn center(&self) -> Vec2 {
        (self.a + self.b) * 0.5
    }

    /// Unit normal (zero for a degenerate piece)
    pub fn normal(&self) -> Vec2 {
        (self.b - self.a).perp().normalize_or_zero()
    }
}

/// How a projectile treats a beam that hits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Absorbs the beam
    Plain,
    /// Sends the beam out of the paired portal projectile
    Portal { sibling: ProjectileId },
}

/// A circular in-flight projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// Rectangular playfield holding pieces and projectiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pieces: Vec<Piece>,
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pieces: Vec::new(),
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_piece(&mut self, kind: PieceKind, a: Vec2, b: Vec2) -> PieceId {
        let id = PieceId(self.alloc_id());
        self.pieces.push(Piece { id, kind, a, b });
        id
    }

    /// Add two linked portal pieces, each given as its end points
    pub fn add_portal_pair(
        &mut self,
        first: (Vec2, Vec2),
        second: (Vec2, Vec2),
    ) -> (PieceId, PieceId) {
        let id_a = PieceId(self.alloc_id());
        let id_b = PieceId(self.alloc_id());
        self.pieces.push(Piece {
            id: id_a,
            kind: PieceKind::Portal { sibling: id_b },
            a: first.0,
            b: first.1,
        });
        self.pieces.push(Piece {
            id: id_b,
            kind: PieceKind::Portal { sibling: id_a },
            a: second.0,
            b: second.1,
        });
        (id_a, id_b)
    }

    pub fn add_projectile(&mut self, pos: Vec2, radius: f32) -> ProjectileId {
        let id = ProjectileId(self.alloc_id());
        self.projectiles.push(Projectile {
            id,
            kind: ProjectileKind::Plain,
            pos,
            radius,
        });
        id
    }

    pub fn add_portal_projectile_pair(
        &mut self,
        first: Vec2,
        second: Vec2,
        radius: f32,
    ) -> (ProjectileId, ProjectileId) {
        let id_a = ProjectileId(self.alloc_id());
        let id_b = ProjectileId(self.alloc_id());
        self.projectiles.push(Projectile {
            id: id_a,
            kind: ProjectileKind::Portal { sibling: id_b },
            pos: first,
            radius,
        });
        self.projectiles.push(Projectile {
            id: id_b,
            kind: ProjectileKind::Portal { sibling: id_a },
            pos: second,
            radius,
        });
        (id_a, id_b)
    }

    /// Destroy a piece; beams stop seeing it on their next rebuild
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let index = self.pieces.iter().position(|p| p.id == id)?;
        Some(self.pieces.remove(index))
    }

    pub fn remove_projectile(&mut self, id: ProjectileId) -> Option<Projectile> {
        let index = self.projectiles.iter().position(|p| p.id == id)?;
        Some(self.projectiles.remove(index))
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }
}

/// Smallest `t` over `items`; earlier items win ties
fn nearest<T, Id>(
    items: impl Iterator<Item = T>,
    mut hit: impl FnMut(&T) -> Option<(Id, f32)>,
) -> Option<(Id, f32)> {
    let mut best: Option<(Id, f32)> = None;
    for item in items {
        if let Some((id, t)) = hit(&item) {
            if best.as_ref().is_none_or(|&(_, best_t)| t < best_t) {
                best = Some((id, t));
            }
        }
    }
    best
}

impl BeamLevel for Arena {
    fn nearest_level_piece(&self, ray: &Ray2D, ignore: &ColliderSet) -> Option<(PieceId, f32)> {
        nearest(
            self.pieces
                .iter()
                .filter(|p| !ignore.contains(&ColliderId::Piece(p.id))),
            |p| ray_segment_intersection(ray, p.a, p.b).map(|t| (p.id, t)),
        )
    }

    fn nearest_projectile(
        &self,
        ray: &Ray2D,
        ignore: &ColliderSet,
    ) -> Option<(ProjectileId, f32)> {
        nearest(
            self.projectiles
                .iter()
                .filter(|p| !ignore.contains(&ColliderId::Projectile(p.id))),
            |p| ray_circle_intersection(ray, p.pos, p.radius).map(|t| (p.id, t)),
        )
    }

    fn max_ray_length(&self) -> f32 {
        Vec2::new(self.width, self.height).length()
    }

    fn reflection_refraction_rays(
        &self,
        target: Reflector,
        hit_point: Vec2,
        incoming: Vec2,
    ) -> Vec<Ray2D> {
        match target {
            Reflector::Piece(id) => {
                let Some(piece) = self.piece(id) else {
                    return Vec::new();
                };
                match piece.kind {
                    PieceKind::Solid => Vec::new(),
                    PieceKind::Mirror => {
                        vec![Ray2D::new(hit_point, reflect(incoming, piece.normal()))]
                    }
                    PieceKind::Glass => vec![Ray2D::new(hit_point, incoming)],
                    PieceKind::Prism { rays, spread } => {
                        let base = Ray2D::new(hit_point, incoming);
                        let n = rays.max(1) as usize;
                        if n == 1 {
                            return vec![base];
                        }
                        (0..n)
                            .map(|i| {
                                let frac = i as f32 / (n - 1) as f32;
                                base.rotated(-spread * 0.5 + spread * frac)
                            })
                            .collect()
                    }
                    PieceKind::Portal { sibling } => match self.piece(sibling) {
                        // Same offset from the centre, same heading
                        Some(exit) => vec![Ray2D::new(
                            exit.center() + (hit_point - piece.center()),
                            incoming,
                        )],
                        None => Vec::new(),
                    },
                }
            }
            Reflector::Projectile(id) => {
                let Some(projectile) = self.projectile(id) else {
                    return Vec::new();
                };
                match projectile.kind {
                    ProjectileKind::Plain => Vec::new(),
                    ProjectileKind::Portal { sibling } => match self.projectile(sibling) {
                        Some(exit) => vec![Ray2D::new(
                            exit.pos + (hit_point - projectile.pos),
                            incoming,
                        )],
                        None => Vec::new(),
                    },
                }
            }
        }
    }

    fn sibling_portal(&self, target: Reflector) -> Option<Reflector> {
        match target {
            Reflector::Piece(id) => match self.piece(id)?.kind {
                PieceKind::Portal { sibling } => {
                    self.piece(sibling).map(|_| Reflector::Piece(sibling))
                }
                _ => None,
            },
            Reflector::Projectile(id) => match self.projectile(id)?.kind {
                ProjectileKind::Portal { sibling } => self
                    .projectile(sibling)
                    .map(|_| Reflector::Projectile(sibling)),
                ProjectileKind::Plain => None,
            },
        }
    }
}

/// Axis-aligned paddle box that records every beam hit
#[derive(Debug, Clone, Default)]
pub struct ArenaPaddle {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
    pub hits: Vec<PaddleBeamHit>,
}

impl ArenaPaddle {
    pub fn new(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            center,
            half_width,
            half_height,
            hits: Vec::new(),
        }
    }

    /// Pose handed to the laser emitter; the whole top edge is flat
    pub fn pose(&self, sticky: bool) -> PaddlePose {
        PaddlePose {
            center: self.center,
            half_height: self.half_height,
            half_flat_top_width: self.half_width,
            up: Vec2::Y,
            sticky,
        }
    }

    /// Total damage per second currently landing on the paddle
    pub fn incoming_dps(&self) -> i32 {
        self.hits.iter().map(|h| h.damage_per_second).sum()
    }
}

impl BeamPaddle for ArenaPaddle {
    fn collision_check(&self, ray: &Ray2D) -> Option<f32> {
        let half = Vec2::new(self.half_width, self.half_height);
        ray_aabb_intersection(ray, self.center - half, self.center + half)
    }

    fn hit_by_beam(&mut self, hit: &PaddleBeamHit) {
        self.hits.push(*hit);
    }
}
