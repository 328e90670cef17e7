//! Nearest-hit resolution and what happens when a segment hits something
//!
//! Each segment is fired into the level once per rebuild. Every obstacle
//! category (level pieces, the paddle, projectiles) proposes at most one
//! candidate; the closest candidate wins and is applied, the rest are dropped.
//! A segment therefore never passes through a near obstacle to reach a far one.

use std::collections::VecDeque;

use rand_pcg::Pcg32;

use super::beam::{BeamId, BeamKind};
use super::segment::{BeamSegment, RadiusPulse, SeedSegment, SegmentId};
use super::world::{
    BeamLevel, BeamPaddle, ColliderId, ColliderSet, PaddleBeamHit, PieceId, ProjectileId,
    Reflector,
};
use crate::settings::BeamSettings;

/// Outcome handler chosen for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderStrategy {
    /// Segment ends on a level piece, which may reflect, refract or split it
    LevelPiece { piece: PieceId, t: f32 },
    /// Segment hits the paddle, which absorbs it
    Paddle {
        t: f32,
        /// Nominal segment length: the paddle never truncates the beam
        extent: f32,
    },
    /// Segment ends on a projectile, which may reflect or teleport it
    Projectile { projectile: ProjectileId, t: f32 },
}

impl ColliderStrategy {
    /// Ray parameter of the hit, used to pick the nearest candidate
    #[inline]
    pub fn hit_distance(&self) -> f32 {
        match *self {
            ColliderStrategy::LevelPiece { t, .. }
            | ColliderStrategy::Paddle { t, .. }
            | ColliderStrategy::Projectile { t, .. } => t,
        }
    }

    /// Identity of the thing that was hit
    pub fn target(&self) -> ColliderId {
        match *self {
            ColliderStrategy::LevelPiece { piece, .. } => ColliderId::Piece(piece),
            ColliderStrategy::Paddle { .. } => ColliderId::Paddle,
            ColliderStrategy::Projectile { projectile, .. } => ColliderId::Projectile(projectile),
        }
    }

    /// Apply this hit to `current`: end the segment, then (once per target
    /// per pass) spawn children or notify the paddle.
    pub(crate) fn update_beam<L, P>(
        self,
        pass: &mut RebuildPass<'_>,
        current: SegmentId,
        level: &L,
        paddle: &mut P,
    ) where
        L: BeamLevel + ?Sized,
        P: BeamPaddle + ?Sized,
    {
        let max_t = level.max_ray_length();
        let reflector = match self {
            ColliderStrategy::LevelPiece { piece, t } => {
                let reflector = Reflector::Piece(piece);
                pass.segment_mut(current).terminate(t, max_t, Some(reflector));
                Some(reflector)
            }
            ColliderStrategy::Paddle { extent, .. } => {
                pass.segment_mut(current).terminate(extent, max_t, None);
                None
            }
            ColliderStrategy::Projectile { projectile, t } => {
                let reflector = Reflector::Projectile(projectile);
                pass.segment_mut(current).terminate(t, max_t, Some(reflector));
                Some(reflector)
            }
        };

        // Second contact with the same object in one pass ends propagation
        if !pass.things_collided_with.insert(self.target()) {
            return;
        }

        match reflector {
            Some(reflector) => pass.spawn_reflections(current, reflector, level),
            None => {
                let hit = pass.paddle_hit(current, self.hit_distance());
                paddle.hit_by_beam(&hit);
            }
        }
    }
}

/// Fire `segment` into the level and return the winning hit, if any.
///
/// `paddle` is `None` when the segment may not collide with the paddle.
pub fn fire_segment_into_level<L, P>(
    segment: &BeamSegment,
    level: &L,
    paddle: Option<&P>,
) -> Option<ColliderStrategy>
where
    L: BeamLevel + ?Sized,
    P: BeamPaddle + ?Sized,
{
    let ray = segment.ray();
    let ignore: ColliderSet = segment.ignore().into_iter().collect();
    let mut candidates = Vec::with_capacity(3);

    if let Some((piece, t)) = level.nearest_level_piece(ray, &ignore) {
        candidates.push(ColliderStrategy::LevelPiece {
            piece,
            t: t.max(0.0),
        });
    }

    if let Some(paddle) = paddle {
        // Test the centre line and both edges of the beam
        let nearest = ray
            .thickness_rays(segment.radius())
            .iter()
            .filter_map(|r| paddle.collision_check(r))
            .reduce(f32::min);
        if let Some(t) = nearest {
            candidates.push(ColliderStrategy::Paddle {
                t: t.max(0.0),
                extent: level.max_ray_length(),
            });
        }
    }

    if let Some((projectile, t)) = level.nearest_projectile(ray, &ignore) {
        candidates.push(ColliderStrategy::Projectile {
            projectile,
            t: t.max(0.0),
        });
    }

    // Stable sort: on ties the first candidate found wins
    candidates.sort_by(|a, b| a.hit_distance().total_cmp(&b.hit_distance()));
    candidates.into_iter().next()
}

/// Scratch state for one rebuild; nothing here outlives the pass
pub(crate) struct RebuildPass<'a> {
    pub beam: BeamId,
    pub kind: BeamKind,
    pub alpha: f32,
    pub settings: &'a BeamSettings,
    rng: &'a mut Pcg32,
    /// Every segment created this pass, in creation order
    pub segments: Vec<BeamSegment>,
    /// Segments still waiting to be fired (FIFO)
    pub queue: VecDeque<SegmentId>,
    pub things_collided_with: ColliderSet,
}

impl<'a> RebuildPass<'a> {
    pub fn new(
        beam: BeamId,
        kind: BeamKind,
        alpha: f32,
        settings: &'a BeamSettings,
        rng: &'a mut Pcg32,
    ) -> Self {
        Self {
            beam,
            kind,
            alpha,
            settings,
            rng,
            segments: Vec::new(),
            queue: VecDeque::new(),
            things_collided_with: ColliderSet::new(),
        }
    }

    pub fn segment(&self, id: SegmentId) -> &BeamSegment {
        &self.segments[id.index()]
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> &mut BeamSegment {
        &mut self.segments[id.index()]
    }

    fn next_pulse(&mut self) -> RadiusPulse {
        if self.settings.radius_pulse {
            RadiusPulse::random(&mut *self.rng)
        } else {
            RadiusPulse::steady()
        }
    }

    fn enqueue(&mut self, segment: BeamSegment) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(segment);
        self.queue.push_back(id);
        id
    }

    pub fn push_seed(&mut self, seed: &SeedSegment) -> SegmentId {
        let pulse = self.next_pulse();
        self.enqueue(BeamSegment::from_seed(seed, pulse))
    }

    /// May `current` collide with the paddle this pass?
    pub fn can_hit_paddle(&self, current: SegmentId) -> bool {
        let own_emitter = self.kind.spares_origin_segments() && self.segment(current).is_origin();
        let faded = self.alpha < self.settings.paddle_alpha_cutoff;
        !(own_emitter || faded)
    }

    fn paddle_hit(&self, current: SegmentId, distance: f32) -> PaddleBeamHit {
        let segment = self.segment(current);
        PaddleBeamHit {
            beam: self.beam,
            kind: self.kind,
            ray: *segment.ray(),
            distance,
            radius: segment.radius(),
            damage_per_second: segment.damage_per_second(),
            alpha: self.alpha,
        }
    }

    /// Ask `target` how it redirects the beam and queue one child per ray
    fn spawn_reflections<L>(&mut self, parent: SegmentId, target: Reflector, level: &L)
    where
        L: BeamLevel + ?Sized,
    {
        let (hit_point, incoming, radius, dps) = {
            let segment = self.segment(parent);
            (
                segment.end_point(),
                segment.ray().direction(),
                segment.radius(),
                segment.damage_per_second(),
            )
        };

        let rays: Vec<_> = level
            .reflection_refraction_rays(target, hit_point, incoming)
            .into_iter()
            .filter(|ray| !ray.is_degenerate())
            .collect();

        // Children leave through the sibling portal, so that one is both
        // ignored by them and counted as already hit
        let mut ignore = ColliderId::from(target);
        if let Some(sibling) = level.sibling_portal(target) {
            ignore = ColliderId::from(sibling);
            self.things_collided_with.insert(ignore);
        }

        if rays.is_empty() {
            return;
        }

        let count = rays.len();
        let child_radius =
            self.alpha * (radius / count as f32).max(self.settings.min_beam_radius);
        let child_dps =
            (self.alpha * (dps / count as i32).max(self.settings.min_dmg_per_sec) as f32) as i32;

        if child_radius <= 0.0 || child_dps <= 0 {
            log::trace!(
                "Beam {:?}: dropping {} children of segment {:?} (radius {}, dps {})",
                self.beam,
                count,
                parent,
                child_radius,
                child_dps
            );
            return;
        }

        for ray in rays {
            let pulse = self.next_pulse();
            let child = self.enqueue(BeamSegment::spawned(
                ray,
                child_radius,
                child_dps,
                ignore,
                parent,
                pulse,
            ));
            self.segment_mut(parent).add_child(child);
        }
    }
}
