//! Origin + unit direction ray used by every beam hit test

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An immutable 2D ray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray2D {
    origin: Vec2,
    direction: Vec2,
}

impl Ray2D {
    /// Create a ray; `direction` is normalized (a zero vector gives a degenerate ray)
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Unit direction of travel
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// True when the ray has no direction to travel in
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec2::ZERO
    }

    /// Point at parameter `t` along the ray
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }

    /// Unit vector perpendicular to the direction (counter-clockwise)
    #[inline]
    pub fn perpendicular(&self) -> Vec2 {
        self.direction.perp()
    }

    /// Parallel ray shifted sideways by `amount`
    pub fn offset(&self, amount: f32) -> Self {
        Self {
            origin: self.origin + self.perpendicular() * amount,
            direction: self.direction,
        }
    }

    /// The centre ray plus the two edge rays of a beam of half-width `radius`
    pub fn thickness_rays(&self, radius: f32) -> [Ray2D; 3] {
        [*self, self.offset(radius), self.offset(-radius)]
    }

    /// Same origin, direction rotated counter-clockwise by `radians`
    pub fn rotated(&self, radians: f32) -> Self {
        Self {
            origin: self.origin,
            direction: Vec2::from_angle(radians).rotate(self.direction),
        }
    }
}
