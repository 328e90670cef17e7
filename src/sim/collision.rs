//! Ray intersection tests against level geometry
//!
//! Every test returns the ray parameter `t` of the first contact (never
//! negative), so callers can compare hits across obstacle categories.

use glam::Vec2;

use super::ray::Ray2D;

/// Rays closer to parallel than this are treated as missing a line
const PARALLEL_EPSILON: f32 = 1e-6;

/// Reflect a direction off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
/// The sign of `normal` does not matter.
#[inline]
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Intersect a ray with the line segment `a`-`b`
pub fn ray_segment_intersection(ray: &Ray2D, a: Vec2, b: Vec2) -> Option<f32> {
    let d = ray.direction();
    let e = b - a;
    let denom = d.perp_dot(e);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    // Solve origin + t*d = a + u*e
    let w = a - ray.origin();
    let t = w.perp_dot(e) / denom;
    let u = w.perp_dot(d) / denom;

    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Intersect a ray with a circle; a ray starting inside hits at `t = 0`
pub fn ray_circle_intersection(ray: &Ray2D, center: Vec2, radius: f32) -> Option<f32> {
    let oc = ray.origin() - center;
    let b = oc.dot(ray.direction());
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t_far = -b + root;
    if t_far < 0.0 {
        // Circle is behind the ray
        return None;
    }
    Some((-b - root).max(0.0))
}

/// Intersect a ray with an axis-aligned box (slab test)
pub fn ray_aabb_intersection(ray: &Ray2D, min: Vec2, max: Vec2) -> Option<f32> {
    let o = ray.origin();
    let d = ray.direction();
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..2 {
        if d[axis].abs() < PARALLEL_EPSILON {
            // Parallel to this slab: must already be inside it
            if o[axis] < min[axis] || o[axis] > max[axis] {
                return None;
            }
        } else {
            let t1 = (min[axis] - o[axis]) / d[axis];
            let t2 = (max[axis] - o[axis]) / d[axis];
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }
    }

    if t_exit < t_enter.max(0.0) {
        None
    } else {
        Some(t_enter.max(0.0))
    }
}
