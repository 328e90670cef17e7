//! Beams: lifetime, fade-out and the per-tick segment rebuild
//!
//! A beam owns every segment it is currently drawn with. A rebuild fires the
//! seed segments into the level, follows reflections breadth-first and then
//! either adopts the new segments or, when nothing moved, keeps the old ones.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collider::{RebuildPass, fire_segment_into_level};
use super::segment::{BeamSegment, SeedSegment, SegmentId};
use super::world::{BeamLevel, BeamPaddle, Reflector};
use crate::error::{BeamError, Result};
use crate::settings::BeamSettings;

/// Identity of a beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeamId(pub u32);

/// What emitted the beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamKind {
    /// Fired upward from the player's paddle
    PaddleLaser,
    /// Fired by a boss or turret; free to hit the paddle from its first segment
    BossLaser,
}

impl BeamKind {
    /// Whether origin segments skip paddle collision (a beam can't hit its own emitter)
    #[inline]
    pub fn spares_origin_segments(&self) -> bool {
        matches!(self, BeamKind::PaddleLaser)
    }
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamPhase {
    /// Created, never built
    Spawning,
    /// Full strength
    Alive,
    /// Inside the final fade window
    FadingOut,
    /// Lifetime over; waiting to be removed
    Dead,
}

/// Result of a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// First build: segments adopted, nothing to compare against
    FirstBuild,
    /// Geometry differed; new segments adopted
    Changed,
    /// Geometry identical; old segments kept
    Unchanged,
}

/// Damage a segment deals this tick to the thing it ends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamContact {
    pub beam: BeamId,
    pub segment: SegmentId,
    pub target: Reflector,
    pub damage: f64,
}

/// A fading emitter of connected ray segments
#[derive(Debug, Clone)]
pub struct Beam {
    id: BeamId,
    kind: BeamKind,
    base_damage_per_second: i32,
    life_total: f64,
    life_elapsed: f64,
    alpha: f32,
    alpha_dirty: bool,
    /// Live segments in build order; `SegmentId` indexes this list
    segments: Vec<BeamSegment>,
    settings: BeamSettings,
    rng: Pcg32,
}

impl Beam {
    /// Create an unbuilt beam. `life_total` may be `INFINITE_LIFETIME`.
    pub fn try_new(
        id: BeamId,
        kind: BeamKind,
        damage_per_second: i32,
        life_total: f64,
        settings: BeamSettings,
    ) -> Result<Self> {
        let min = settings.min_allowed_lifetime();
        if life_total.is_nan() || life_total < min {
            return Err(BeamError::LifetimeTooShort {
                got: life_total,
                min,
            });
        }
        if damage_per_second < 0 {
            return Err(BeamError::NegativeDamage(damage_per_second));
        }

        let rng_seed = settings
            .rng_seed
            .wrapping_add((id.0 as u64).wrapping_mul(2654435761));
        Ok(Self {
            id,
            kind,
            base_damage_per_second: damage_per_second,
            life_total,
            life_elapsed: 0.0,
            alpha: 1.0,
            alpha_dirty: false,
            segments: Vec::new(),
            settings,
            rng: Pcg32::seed_from_u64(rng_seed),
        })
    }

    #[inline]
    pub fn id(&self) -> BeamId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BeamKind {
        self.kind
    }

    pub fn base_damage_per_second(&self) -> i32 {
        self.base_damage_per_second
    }

    pub fn set_base_damage_per_second(&mut self, damage_per_second: i32) {
        self.base_damage_per_second = damage_per_second.max(0);
    }

    pub fn life_total(&self) -> f64 {
        self.life_total
    }

    pub fn life_elapsed(&self) -> f64 {
        self.life_elapsed
    }

    /// Opacity in [0, 1]; also scales the strength of spawned children
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_dirty(&self) -> bool {
        self.alpha_dirty
    }

    pub fn settings(&self) -> &BeamSettings {
        &self.settings
    }

    /// Segments from the last adopted rebuild, in build order
    pub fn segments(&self) -> &[BeamSegment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&BeamSegment> {
        self.segments.get(id.index())
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life_elapsed >= self.life_total
    }

    fn fade_start(&self) -> f64 {
        self.life_total - self.settings.fade_window
    }

    pub fn phase(&self) -> BeamPhase {
        if self.is_dead() {
            BeamPhase::Dead
        } else if self.segments.is_empty() {
            BeamPhase::Spawning
        } else if self.life_elapsed < self.fade_start() {
            BeamPhase::Alive
        } else {
            BeamPhase::FadingOut
        }
    }

    /// Restart the lifetime clock (e.g. the power-up was collected again)
    pub fn reset_time_elapsed(&mut self) {
        self.life_elapsed = 0.0;
        self.update_alpha();
    }

    /// Advance lifetime and animation by `dt` seconds.
    /// Returns true once the beam is dead.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.is_dead() {
            return true;
        }

        for segment in &mut self.segments {
            segment.tick(dt);
        }
        self.life_elapsed = (self.life_elapsed + dt).min(self.life_total);
        self.update_alpha();

        self.is_dead()
    }

    fn update_alpha(&mut self) {
        let previous = self.alpha;
        let fade_start = self.fade_start();
        self.alpha = if self.life_elapsed < fade_start {
            1.0
        } else {
            crate::lerp_over_time(fade_start, self.life_total, 1.0, 0.0, self.life_elapsed)
        };
        debug_assert!((0.0..=1.0).contains(&self.alpha));

        if previous != self.alpha {
            self.alpha_dirty = true;
        }
    }

    /// Rebuild the segment tree from `seeds` against the current level.
    ///
    /// # Panics
    /// If `seeds` is empty; a beam always has at least one origin segment.
    pub fn rebuild<L, P>(
        &mut self,
        seeds: &[SeedSegment],
        level: &L,
        paddle: &mut P,
    ) -> RebuildOutcome
    where
        L: BeamLevel + ?Sized,
        P: BeamPaddle + ?Sized,
    {
        assert!(
            !seeds.is_empty(),
            "beam {:?} rebuilt without seed segments",
            self.id
        );

        let mut pass = RebuildPass::new(
            self.id,
            self.kind,
            self.alpha,
            &self.settings,
            &mut self.rng,
        );
        for seed in seeds {
            pass.push_seed(seed);
        }

        while let Some(current) = pass.queue.pop_front() {
            let paddle_allowed = pass.can_hit_paddle(current);
            let hit = fire_segment_into_level(
                pass.segment(current),
                level,
                paddle_allowed.then_some(&*paddle),
            );
            match hit {
                Some(strategy) => strategy.update_beam(&mut pass, current, level, paddle),
                None => {
                    // Out of the playfield
                    let max_t = level.max_ray_length();
                    pass.segment_mut(current).terminate(max_t, max_t, None);
                }
            }
        }

        let new_segments = pass.segments;
        let outcome = if self.segments.is_empty() {
            self.segments = new_segments;
            RebuildOutcome::FirstBuild
        } else if self.has_changed(&new_segments) {
            self.segments = new_segments;
            RebuildOutcome::Changed
        } else {
            RebuildOutcome::Unchanged
        };

        log::debug!(
            "Beam {:?} rebuilt: {:?} ({} segments, alpha {:.3})",
            self.id,
            outcome,
            self.segments.len(),
            self.alpha
        );
        self.alpha_dirty = false;
        outcome
    }

    /// Would adopting `candidate` change what observers see?
    pub fn has_changed(&self, candidate: &[BeamSegment]) -> bool {
        if self.segments.len() != candidate.len() || self.alpha_dirty {
            return true;
        }
        let epsilon = self.settings.segment_epsilon;
        self.segments
            .iter()
            .zip(candidate)
            .any(|(old, new)| !old.matches(new, epsilon))
    }

    /// Damage each live segment deals over `dt` to the piece or projectile it ends on
    pub fn damage_contacts(&self, dt: f64) -> Vec<BeamContact> {
        if self.is_dead() {
            return Vec::new();
        }
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(i, segment)| {
                segment.colliding().map(|target| BeamContact {
                    beam: self.id,
                    segment: SegmentId(i as u32),
                    target,
                    damage: dt * segment.damage_per_second() as f64,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{INFINITE_LIFETIME, MIN_ALLOWED_LIFETIME, MIN_BEAM_RADIUS};
    use crate::sim::arena::{Arena, ArenaPaddle, PieceKind};
    use crate::sim::ray::Ray2D;
    use crate::sim::world::{ColliderId, NoPaddle, PieceId};
    use glam::Vec2;
    use proptest::prelude::*;

    fn settings() -> BeamSettings {
        BeamSettings {
            radius_pulse: false,
            ..Default::default()
        }
    }

    fn beam(kind: BeamKind, life: f64) -> Beam {
        Beam::try_new(BeamId(1), kind, 100, life, settings()).unwrap()
    }

    fn seed(origin: Vec2, dir: Vec2) -> SeedSegment {
        SeedSegment::new(Ray2D::new(origin, dir), 0.5, 100).unwrap()
    }

    #[test]
    fn test_construction_rejects_short_lifetime() {
        for life in [0.0, 0.5, -1.0, f64::NAN] {
            assert!(matches!(
                Beam::try_new(BeamId(1), BeamKind::PaddleLaser, 100, life, settings()),
                Err(BeamError::LifetimeTooShort { .. })
            ));
        }
        for life in [MIN_ALLOWED_LIFETIME, INFINITE_LIFETIME] {
            assert!(Beam::try_new(BeamId(1), BeamKind::PaddleLaser, 100, life, settings()).is_ok());
        }
        assert!(matches!(
            Beam::try_new(BeamId(1), BeamKind::PaddleLaser, -5, 2.0, settings()),
            Err(BeamError::NegativeDamage(-5))
        ));
    }

    #[test]
    fn test_fade_alpha_values() {
        let mut beam = beam(BeamKind::PaddleLaser, 2.0);
        assert!(!beam.tick(1.0));
        assert_eq!(beam.alpha(), 1.0);

        assert!(!beam.tick(0.9));
        assert!((beam.alpha() - 0.1333).abs() < 0.001);
        assert!(beam.alpha_dirty());

        assert!(beam.tick(0.5));
        assert_eq!(beam.alpha(), 0.0);
        assert_eq!(beam.life_elapsed(), 2.0);
        assert_eq!(beam.phase(), BeamPhase::Dead);

        // Stays dead
        assert!(beam.tick(0.1));
        assert_eq!(beam.life_elapsed(), 2.0);
    }

    #[test]
    fn test_infinite_beam_never_dies() {
        let mut beam = beam(BeamKind::BossLaser, INFINITE_LIFETIME);
        for _ in 0..1000 {
            assert!(!beam.tick(10.0));
        }
        assert_eq!(beam.alpha(), 1.0);
        assert!(!beam.alpha_dirty());
    }

    #[test]
    fn test_phases() {
        let arena = Arena::new(12.0, 16.0);
        let mut beam = beam(BeamKind::PaddleLaser, 2.0);
        assert_eq!(beam.phase(), BeamPhase::Spawning);

        beam.rebuild(&[seed(Vec2::new(6.0, 0.0), Vec2::Y)], &arena, &mut NoPaddle);
        assert_eq!(beam.phase(), BeamPhase::Alive);

        beam.tick(1.5);
        assert_eq!(beam.phase(), BeamPhase::FadingOut);

        beam.tick(1.0);
        assert_eq!(beam.phase(), BeamPhase::Dead);
    }

    #[test]
    fn test_reset_time_elapsed_restores_full_alpha() {
        let mut beam = beam(BeamKind::PaddleLaser, 2.0);
        beam.tick(1.9);
        assert!(beam.alpha() < 1.0);
        beam.reset_time_elapsed();
        assert_eq!(beam.life_elapsed(), 0.0);
        assert_eq!(beam.alpha(), 1.0);
    }

    #[test]
    fn test_straight_beam_exits_level() {
        // 12 x 16 level has a diagonal of 20
        let arena = Arena::new(12.0, 16.0);
        let mut beam = beam(BeamKind::PaddleLaser, 2.0);
        let outcome = beam.rebuild(&[seed(Vec2::new(6.0, 0.0), Vec2::Y)], &arena, &mut NoPaddle);

        assert_eq!(outcome, RebuildOutcome::FirstBuild);
        assert_eq!(beam.segments().len(), 1);
        let segment = &beam.segments()[0];
        assert!((segment.end_parameter() - 20.0).abs() < 1e-5);
        assert!(segment.children().is_empty());
        assert!(segment.colliding().is_none());
    }

    #[test]
    fn test_rebuild_without_world_change_is_unchanged() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 10.0), Vec2::new(10.0, 5.0));
        let seeds = [seed(Vec2::new(5.0, 0.0), Vec2::Y)];
        let mut beam =
            Beam::try_new(BeamId(3), BeamKind::PaddleLaser, 100, 5.0, BeamSettings::default())
                .unwrap();

        assert_eq!(beam.rebuild(&seeds, &arena, &mut NoPaddle), RebuildOutcome::FirstBuild);
        let before: Vec<_> = beam.segments().iter().map(|s| s.end_point()).collect();
        assert_eq!(beam.rebuild(&seeds, &arena, &mut NoPaddle), RebuildOutcome::Unchanged);
        assert_eq!(beam.rebuild(&seeds, &arena, &mut NoPaddle), RebuildOutcome::Unchanged);
        let after: Vec<_> = beam.segments().iter().map(|s| s.end_point()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rebuild_detects_moved_emitter() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(PieceKind::Solid, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let mut beam = beam(BeamKind::PaddleLaser, 5.0);

        beam.rebuild(&[seed(Vec2::new(5.0, 0.0), Vec2::Y)], &arena, &mut NoPaddle);
        let outcome = beam.rebuild(&[seed(Vec2::new(6.0, 0.0), Vec2::Y)], &arena, &mut NoPaddle);
        assert_eq!(outcome, RebuildOutcome::Changed);
        assert!((beam.segments()[0].start_point().x - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_change_forces_adoption() {
        let arena = Arena::new(20.0, 20.0);
        let seeds = [seed(Vec2::new(5.0, 0.0), Vec2::Y)];
        let mut beam = beam(BeamKind::PaddleLaser, 2.0);
        beam.rebuild(&seeds, &arena, &mut NoPaddle);

        beam.tick(1.5);
        assert!(beam.alpha_dirty());
        assert_eq!(beam.rebuild(&seeds, &arena, &mut NoPaddle), RebuildOutcome::Changed);
        assert!(!beam.alpha_dirty());
        assert_eq!(beam.rebuild(&seeds, &arena, &mut NoPaddle), RebuildOutcome::Unchanged);
    }

    #[test]
    #[should_panic(expected = "without seed segments")]
    fn test_rebuild_without_seeds_panics() {
        let arena = Arena::new(20.0, 20.0);
        let mut beam = beam(BeamKind::PaddleLaser, 2.0);
        beam.rebuild(&[], &arena, &mut NoPaddle);
    }

    #[test]
    fn test_facing_mirrors_stop_on_repeat_hit() {
        let mut arena = Arena::new(20.0, 20.0);
        let lower = arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 2.0), Vec2::new(20.0, 2.0));
        let upper = arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 12.0), Vec2::new(20.0, 12.0));
        let mut beam = beam(BeamKind::BossLaser, 5.0);

        beam.rebuild(&[seed(Vec2::new(10.0, 5.0), Vec2::Y)], &arena, &mut NoPaddle);

        let hits: Vec<_> = beam.segments().iter().map(|s| s.colliding_piece()).collect();
        assert_eq!(hits, vec![Some(upper), Some(lower), Some(upper)]);
        let last = beam.segments().last().unwrap();
        assert!(last.children().is_empty());
    }

    #[test]
    fn test_portal_pair_teleports_without_reentry() {
        let mut arena = Arena::new(40.0, 40.0);
        let (entry, exit) = arena.add_portal_pair(
            (Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0)),
            (Vec2::new(20.0, 10.0), Vec2::new(30.0, 10.0)),
        );
        let incoming = Vec2::new(1.0, 2.0).normalize();
        let mut beam = beam(BeamKind::BossLaser, 5.0);
        beam.rebuild(&[seed(Vec2::new(2.0, 6.0), incoming)], &arena, &mut NoPaddle);

        let segments = beam.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].colliding_piece(), Some(entry));

        let exiting = &segments[1];
        // Offset from portal centre is preserved, exit is at the sibling
        let expected = segments[0].end_point() + Vec2::new(20.0, 0.0);
        assert!((exiting.start_point() - expected).length() < 1e-4);
        assert!((exiting.ray().direction() - incoming).length() < 1e-6);
        assert_eq!(exiting.ignore(), Some(ColliderId::Piece(exit)));
        assert_eq!(exiting.colliding_piece(), None);
    }

    #[test]
    fn test_portal_facing_itself_terminates() {
        // Entry portal above the exit: the exiting beam flies straight back into the entry
        let mut arena = Arena::new(40.0, 40.0);
        let (entry, _exit) = arena.add_portal_pair(
            (Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0)),
            (Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0)),
        );
        let mut beam = beam(BeamKind::BossLaser, 5.0);
        beam.rebuild(&[seed(Vec2::new(5.0, 7.0), Vec2::Y)], &arena, &mut NoPaddle);

        let segments = beam.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].colliding_piece(), Some(entry));
        assert!(segments[1].children().is_empty());
    }

    #[test]
    fn test_paddle_laser_origin_skips_paddle() {
        let arena = Arena::new(20.0, 20.0);
        let mut paddle = ArenaPaddle::new(Vec2::new(10.0, 1.0), 1.5, 0.25);
        let seeds = [seed(Vec2::new(10.0, 1.25), Vec2::Y)];

        let mut laser = beam(BeamKind::PaddleLaser, 5.0);
        laser.rebuild(&seeds, &arena, &mut paddle);
        assert!(paddle.hits.is_empty());

        // A boss beam fired down at the paddle does hit it
        let mut boss = Beam::try_new(BeamId(2), BeamKind::BossLaser, 80, 5.0, settings()).unwrap();
        boss.rebuild(&[seed(Vec2::new(10.0, 15.0), -Vec2::Y)], &arena, &mut paddle);
        assert_eq!(paddle.hits.len(), 1);
        assert_eq!(paddle.hits[0].beam, BeamId(2));
        assert!((paddle.hits[0].distance - 13.75).abs() < 1e-4);
        // The paddle absorbs without truncating the drawn segment
        assert_eq!(boss.segments().len(), 1);
        assert!(boss.segments()[0].colliding().is_none());
    }

    #[test]
    fn test_reflected_paddle_laser_can_hit_paddle() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let mut paddle = ArenaPaddle::new(Vec2::new(10.0, 1.0), 1.5, 0.25);
        let mut laser = beam(BeamKind::PaddleLaser, 5.0);

        laser.rebuild(&[seed(Vec2::new(10.0, 1.25), Vec2::Y)], &arena, &mut paddle);
        assert_eq!(paddle.hits.len(), 1);
        assert_eq!(laser.segments().len(), 2);
    }

    #[test]
    fn test_faded_beam_spares_paddle() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let mut paddle = ArenaPaddle::new(Vec2::new(10.0, 1.0), 1.5, 0.25);
        let mut laser = beam(BeamKind::PaddleLaser, 2.0);
        // alpha = (2.0 - 1.8) / 0.75 ~ 0.27
        laser.tick(1.8);
        assert!(laser.alpha() < 0.33);

        laser.rebuild(&[seed(Vec2::new(10.0, 1.25), Vec2::Y)], &arena, &mut paddle);
        assert!(paddle.hits.is_empty());
    }

    #[test]
    fn test_fading_beam_spawns_weaker_children() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let mut laser = beam(BeamKind::PaddleLaser, 2.0);
        laser.tick(1.625); // alpha = 0.5

        laser.rebuild(&[seed(Vec2::new(10.0, 1.0), Vec2::Y)], &arena, &mut NoPaddle);
        let child = &laser.segments()[1];
        assert!((child.radius() - 0.25).abs() < 1e-5);
        assert_eq!(child.damage_per_second(), 50);
    }

    #[test]
    fn test_heavy_split_keeps_damped_children() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(
            PieceKind::Prism { rays: 4, spread: 1.0 },
            Vec2::new(0.0, 10.0),
            Vec2::new(20.0, 10.0),
        );
        let mut laser = beam(BeamKind::PaddleLaser, 2.0);
        laser.tick(1.5); // alpha = 0.666
        let thin = SeedSegment::new(Ray2D::new(Vec2::new(10.0, 1.0), Vec2::Y), 0.1, 100).unwrap();

        laser.rebuild(&[thin], &arena, &mut NoPaddle);
        // 0.1 / 4 floors to MIN_BEAM_RADIUS before alpha scales it down
        assert_eq!(laser.segments().len(), 5);
        assert_eq!(laser.segments()[0].children().len(), 4);
        let expected = laser.alpha() * MIN_BEAM_RADIUS;
        for child in &laser.segments()[1..] {
            assert!((child.radius() - expected).abs() < 1e-6);
            assert_eq!(child.damage_per_second(), (laser.alpha() * 25.0) as i32);
        }
    }

    #[test]
    fn test_floored_segment_still_reflects_while_fading() {
        let mut arena = Arena::new(20.0, 20.0);
        arena.add_piece(PieceKind::Mirror, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let mut boss = beam(BeamKind::BossLaser, 2.0);
        boss.tick(1.3); // alpha ~ 0.933
        let thin = SeedSegment::new(
            Ray2D::new(Vec2::new(10.0, 1.0), Vec2::Y),
            MIN_BEAM_RADIUS,
            100,
        )
        .unwrap();

        boss.rebuild(&[thin], &arena, &mut NoPaddle);
        assert_eq!(boss.segments().len(), 2);
        let child = &boss.segments()[1];
        assert!((child.radius() - boss.alpha() * MIN_BEAM_RADIUS).abs() < 1e-6);
        assert!(child.radius() < MIN_BEAM_RADIUS);
    }

    #[test]
    fn test_portal_projectiles_teleport_without_reentry() {
        let mut arena = Arena::new(40.0, 40.0);
        let (entry, exit) =
            arena.add_portal_projectile_pair(Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0), 1.0);
        let mut boss = beam(BeamKind::BossLaser, 5.0);
        boss.rebuild(&[seed(Vec2::new(10.0, 2.0), Vec2::Y)], &arena, &mut NoPaddle);

        let segments = boss.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].colliding_projectile(), Some(entry));
        assert!((segments[0].end_point() - Vec2::new(10.0, 9.0)).length() < 1e-4);

        let exiting = &segments[1];
        assert!((exiting.start_point() - Vec2::new(30.0, 9.0)).length() < 1e-4);
        assert_eq!(exiting.ignore(), Some(ColliderId::Projectile(exit)));
        assert_eq!(exiting.parent(), Some(SegmentId(0)));
        assert!(exiting.colliding().is_none());
    }

    #[test]
    fn test_portal_projectile_facing_itself_terminates() {
        // Exit sits below the entry: the teleported beam flies back into the entry
        let mut arena = Arena::new(40.0, 40.0);
        let (entry, exit) =
            arena.add_portal_projectile_pair(Vec2::new(10.0, 10.0), Vec2::new(10.0, 4.0), 1.0);
        let mut boss = beam(BeamKind::BossLaser, 5.0);
        boss.rebuild(&[seed(Vec2::new(10.0, 6.0), Vec2::Y)], &arena, &mut NoPaddle);

        let segments = boss.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].ignore(), Some(ColliderId::Projectile(exit)));
        assert_eq!(segments[1].colliding_projectile(), Some(entry));
        assert!((segments[1].length() - 6.0).abs() < 1e-4);
        assert!(segments[1].children().is_empty());
    }

    #[test]
    fn test_damage_contacts() {
        let mut arena = Arena::new(20.0, 20.0);
        let wall = arena.add_piece(PieceKind::Solid, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let mut laser = beam(BeamKind::PaddleLaser, 2.0);
        laser.rebuild(&[seed(Vec2::new(10.0, 1.0), Vec2::Y)], &arena, &mut NoPaddle);

        let contacts = laser.damage_contacts(0.5);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].target, Reflector::Piece(wall));
        assert!((contacts[0].damage - 50.0).abs() < 1e-9);
        assert_ne!(wall, PieceId(0));
    }

    #[test]
    fn test_vanished_piece_is_skipped_next_rebuild() {
        let mut arena = Arena::new(20.0, 20.0);
        let wall = arena.add_piece(PieceKind::Solid, Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0));
        let seeds = [seed(Vec2::new(10.0, 1.0), Vec2::Y)];
        let mut laser = beam(BeamKind::PaddleLaser, 5.0);
        laser.rebuild(&seeds, &arena, &mut NoPaddle);
        assert_eq!(laser.segments()[0].colliding_piece(), Some(wall));

        arena.remove_piece(wall);
        assert_eq!(laser.rebuild(&seeds, &arena, &mut NoPaddle), RebuildOutcome::Changed);
        assert!(laser.segments()[0].colliding().is_none());
    }

    proptest! {
        #[test]
        fn prop_alpha_stays_in_unit_interval(
            life in 0.75f64..20.0,
            steps in prop::collection::vec(0.0f64..0.5, 1..200),
        ) {
            let mut beam =
                Beam::try_new(BeamId(1), BeamKind::PaddleLaser, 100, life, settings()).unwrap();
            for dt in steps {
                beam.tick(dt);
                prop_assert!((0.0..=1.0).contains(&beam.alpha()));
                prop_assert!(beam.life_elapsed() <= beam.life_total());
            }
        }

        #[test]
        fn prop_rebuild_terminates_with_bounded_segments(
            mirrors in prop::collection::vec(
                (0.0f32..20.0, 0.0f32..20.0, 0.0f32..20.0, 0.0f32..20.0),
                0..12,
            ),
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let mut arena = Arena::new(20.0, 20.0);
            for (x0, y0, x1, y1) in &mirrors {
                arena.add_piece(PieceKind::Mirror, Vec2::new(*x0, *y0), Vec2::new(*x1, *y1));
            }
            let mut beam = beam(BeamKind::BossLaser, 5.0);
            let dir = Vec2::from_angle(angle);
            beam.rebuild(&[seed(Vec2::new(10.0, 10.0), dir)], &arena, &mut NoPaddle);

            // Each mirror spawns at most one child per pass
            prop_assert!(beam.segments().len() <= 1 + mirrors.len());
            for segment in beam.segments() {
                prop_assert!(segment.end_parameter() >= 0.0);
                prop_assert!(segment.end_parameter() <= arena.max_ray_length());
            }
        }
    }
}
