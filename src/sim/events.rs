//! Notifications for renderers, audio and scoring

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::beam::BeamId;
use super::segment::BeamSegment;
use super::world::Reflector;

/// Drawable copy of one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    pub start: Vec2,
    pub end: Vec2,
    pub radius: f32,
    pub damage_per_second: i32,
    pub colliding: Option<Reflector>,
}

impl From<&BeamSegment> for SegmentSnapshot {
    fn from(segment: &BeamSegment) -> Self {
        Self {
            start: segment.start_point(),
            end: segment.end_point(),
            radius: segment.display_radius(),
            damage_per_second: segment.damage_per_second(),
            colliding: segment.colliding(),
        }
    }
}

/// Something observers should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BeamEvent {
    /// A beam was created and built for the first time
    Spawned {
        beam: BeamId,
        segments: Vec<SegmentSnapshot>,
    },
    /// A rebuild adopted new geometry
    Changed {
        beam: BeamId,
        segments: Vec<SegmentSnapshot>,
    },
    /// A beam died or was removed
    Removed { beam: BeamId },
}

pub(crate) fn snapshot(segments: &[BeamSegment]) -> Vec<SegmentSnapshot> {
    segments.iter().map(SegmentSnapshot::from).collect()
}
