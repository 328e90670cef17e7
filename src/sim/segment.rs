//! Beam segments: one straight piece of a beam, bounded by a hit or the level edge

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ray::Ray2D;
use super::world::{ColliderId, PieceId, ProjectileId, Reflector};
use crate::consts::RADIUS_PULSE_CHANGES;
use crate::error::{BeamError, Result};

/// Index of a segment inside its beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A segment handed to a rebuild by whatever emits the beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedSegment {
    pub ray: Ray2D,
    pub radius: f32,
    pub damage_per_second: i32,
    /// Object the seed must not collide with (e.g. the block it starts inside)
    pub ignore: Option<ColliderId>,
}

impl SeedSegment {
    pub fn new(ray: Ray2D, radius: f32, damage_per_second: i32) -> Result<Self> {
        if ray.is_degenerate() {
            return Err(BeamError::DegenerateRay);
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(BeamError::InvalidRadius(radius));
        }
        if damage_per_second < 0 {
            return Err(BeamError::NegativeDamage(damage_per_second));
        }
        Ok(Self {
            ray,
            radius,
            damage_per_second,
            ignore: None,
        })
    }

    pub fn ignoring(mut self, collider: ColliderId) -> Self {
        self.ignore = Some(collider);
        self
    }
}

/// Repeating radius animation (rendering only)
///
/// Keyframes hold a scale factor applied to the segment's radius.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiusPulse {
    /// (time, scale) pairs, first at time 0, strictly increasing times
    keys: Vec<(f64, f32)>,
    elapsed: f64,
}

impl RadiusPulse {
    /// No animation: the radius never changes
    pub fn steady() -> Self {
        Self::default()
    }

    /// Full radius, then a handful of random dips and recoveries
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut keys = Vec::with_capacity(1 + 2 * RADIUS_PULSE_CHANGES);
        let mut time = 0.0;
        keys.push((time, 1.0));
        for _ in 0..RADIUS_PULSE_CHANGES {
            time += rng.random::<f64>() * 0.1 + 0.05;
            keys.push((time, rng.random::<f32>() * 0.2 + 0.75));
            time += rng.random::<f64>() * 0.125 + 0.1;
            keys.push((time, 1.0));
        }
        Self { keys, elapsed: 0.0 }
    }

    /// Length of one cycle
    pub fn period(&self) -> f64 {
        self.keys.last().map(|&(t, _)| t).unwrap_or(0.0)
    }

    pub fn tick(&mut self, dt: f64) {
        let period = self.period();
        if period > 0.0 {
            self.elapsed = (self.elapsed + dt) % period;
        }
    }

    /// Current scale factor in (0, 1]
    pub fn scale(&self) -> f32 {
        let Some(next) = self.keys.iter().position(|&(t, _)| t > self.elapsed) else {
            return self.keys.last().map(|&(_, s)| s).unwrap_or(1.0);
        };
        if next == 0 {
            return self.keys[0].1;
        }
        let (t0, s0) = self.keys[next - 1];
        let (t1, s1) = self.keys[next];
        crate::lerp_over_time(t0, t1, s0, s1, self.elapsed)
    }
}

/// One straight piece of a beam
#[derive(Debug, Clone)]
pub struct BeamSegment {
    ray: Ray2D,
    /// Half-width used for collision; never animated
    radius: f32,
    damage_per_second: i32,
    /// Ray parameter where the segment ends
    end_t: f32,
    /// Object this segment may not collide with (usually whatever spawned it)
    ignore: Option<ColliderId>,
    /// Piece or projectile this segment ends on
    colliding: Option<Reflector>,
    /// Seeded by the emitter rather than spawned by a reflection
    origin: bool,
    parent: Option<SegmentId>,
    children: Vec<SegmentId>,
    pulse: RadiusPulse,
}

impl BeamSegment {
    pub(crate) fn from_seed(seed: &SeedSegment, pulse: RadiusPulse) -> Self {
        Self {
            ray: seed.ray,
            radius: seed.radius,
            damage_per_second: seed.damage_per_second,
            end_t: 0.0,
            ignore: seed.ignore,
            colliding: None,
            origin: true,
            parent: None,
            children: Vec::new(),
            pulse,
        }
    }

    pub(crate) fn spawned(
        ray: Ray2D,
        radius: f32,
        damage_per_second: i32,
        ignore: ColliderId,
        parent: SegmentId,
        pulse: RadiusPulse,
    ) -> Self {
        Self {
            ray,
            radius,
            damage_per_second,
            end_t: 0.0,
            ignore: Some(ignore),
            colliding: None,
            origin: false,
            parent: Some(parent),
            children: Vec::new(),
            pulse,
        }
    }

    #[inline]
    pub fn ray(&self) -> &Ray2D {
        &self.ray
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Radius including the pulse animation
    pub fn display_radius(&self) -> f32 {
        self.radius * self.pulse.scale()
    }

    #[inline]
    pub fn damage_per_second(&self) -> i32 {
        self.damage_per_second
    }

    #[inline]
    pub fn end_parameter(&self) -> f32 {
        self.end_t
    }

    #[inline]
    pub fn length(&self) -> f32 {
        debug_assert!(self.end_t >= 0.0);
        self.end_t
    }

    #[inline]
    pub fn start_point(&self) -> Vec2 {
        self.ray.origin()
    }

    #[inline]
    pub fn end_point(&self) -> Vec2 {
        self.ray.point_at(self.end_t)
    }

    pub fn ignore(&self) -> Option<ColliderId> {
        self.ignore
    }

    pub fn colliding(&self) -> Option<Reflector> {
        self.colliding
    }

    pub fn colliding_piece(&self) -> Option<PieceId> {
        match self.colliding {
            Some(Reflector::Piece(id)) => Some(id),
            _ => None,
        }
    }

    pub fn colliding_projectile(&self) -> Option<ProjectileId> {
        match self.colliding {
            Some(Reflector::Projectile(id)) => Some(id),
            _ => None,
        }
    }

    /// True for segments supplied by the emitter
    #[inline]
    pub fn is_origin(&self) -> bool {
        self.origin
    }

    pub fn parent(&self) -> Option<SegmentId> {
        self.parent
    }

    pub fn children(&self) -> &[SegmentId] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: SegmentId) {
        self.children.push(child);
    }

    /// End the segment at `t` (clamped to `[0, max_t]`) touching `colliding`
    pub(crate) fn terminate(&mut self, t: f32, max_t: f32, colliding: Option<Reflector>) {
        self.end_t = t.clamp(0.0, max_t);
        self.colliding = colliding;
    }

    /// Advance the cosmetic animation
    pub fn tick(&mut self, dt: f64) {
        self.pulse.tick(dt);
    }

    /// Same geometry and same contact, within `epsilon`
    pub fn matches(&self, other: &BeamSegment, epsilon: f32) -> bool {
        self.start_point().abs_diff_eq(other.start_point(), epsilon)
            && self.end_point().abs_diff_eq(other.end_point(), epsilon)
            && (self.length() - other.length()).abs() <= epsilon
            && self.colliding == other.colliding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn seed() -> SeedSegment {
        SeedSegment::new(Ray2D::new(Vec2::ZERO, Vec2::Y), 0.5, 100).unwrap()
    }

    #[test]
    fn test_seed_validation() {
        let ray = Ray2D::new(Vec2::ZERO, Vec2::Y);
        assert!(matches!(
            SeedSegment::new(ray, 0.0, 10),
            Err(BeamError::InvalidRadius(_))
        ));
        assert!(matches!(
            SeedSegment::new(ray, f32::NAN, 10),
            Err(BeamError::InvalidRadius(_))
        ));
        assert!(matches!(
            SeedSegment::new(ray, 1.0, -1),
            Err(BeamError::NegativeDamage(-1))
        ));
        assert!(matches!(
            SeedSegment::new(Ray2D::new(Vec2::ZERO, Vec2::ZERO), 1.0, 10),
            Err(BeamError::DegenerateRay)
        ));
    }

    #[test]
    fn test_terminate_clamps_to_ray_length() {
        let mut segment = BeamSegment::from_seed(&seed(), RadiusPulse::steady());
        segment.terminate(-3.0, 20.0, None);
        assert_eq!(segment.end_parameter(), 0.0);
        segment.terminate(35.0, 20.0, None);
        assert_eq!(segment.end_parameter(), 20.0);
        assert!((segment.end_point() - Vec2::new(0.0, 20.0)).length() < 1e-5);
    }

    #[test]
    fn test_matches_compares_geometry_and_contact() {
        let mut a = BeamSegment::from_seed(&seed(), RadiusPulse::steady());
        let mut b = BeamSegment::from_seed(&seed(), RadiusPulse::steady());
        a.terminate(5.0, 20.0, Some(Reflector::Piece(PieceId(1))));
        b.terminate(5.0004, 20.0, Some(Reflector::Piece(PieceId(1))));
        assert!(a.matches(&b, 0.001));

        b.terminate(5.0, 20.0, Some(Reflector::Piece(PieceId(2))));
        assert!(!a.matches(&b, 0.001));

        b.terminate(6.0, 20.0, Some(Reflector::Piece(PieceId(1))));
        assert!(!a.matches(&b, 0.001));
    }

    #[test]
    fn test_colliding_accessors_are_exclusive() {
        let mut segment = BeamSegment::from_seed(&seed(), RadiusPulse::steady());
        segment.terminate(1.0, 20.0, Some(Reflector::Projectile(ProjectileId(7))));
        assert_eq!(segment.colliding_projectile(), Some(ProjectileId(7)));
        assert_eq!(segment.colliding_piece(), None);
    }

    #[test]
    fn test_radius_pulse_stays_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut pulse = RadiusPulse::random(&mut rng);
        assert_eq!(pulse.scale(), 1.0);
        assert!(pulse.period() > 0.0);

        for _ in 0..500 {
            pulse.tick(1.0 / 120.0);
            let scale = pulse.scale();
            assert!((0.75..=1.0).contains(&scale), "scale {scale} out of range");
        }
    }

    #[test]
    fn test_steady_pulse_never_changes() {
        let mut segment = BeamSegment::from_seed(&seed(), RadiusPulse::steady());
        segment.tick(0.3);
        assert_eq!(segment.display_radius(), segment.radius());
    }
}
