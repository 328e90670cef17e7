//! Owns every live beam and turns their lifecycle into events

use super::beam::{Beam, BeamContact, BeamId, BeamKind, RebuildOutcome};
use super::emitter::{PaddleLaserEmitter, PaddlePose};
use super::events::{BeamEvent, snapshot};
use super::segment::SeedSegment;
use super::world::{BeamLevel, BeamPaddle};
use crate::error::{BeamError, Result};
use crate::settings::BeamSettings;

/// All live beams, in spawn order
#[derive(Debug, Clone)]
pub struct BeamManager {
    settings: BeamSettings,
    beams: Vec<Beam>,
    events: Vec<BeamEvent>,
    next_id: u32,
}

impl Default for BeamManager {
    fn default() -> Self {
        Self::new(BeamSettings::default())
    }
}

impl BeamManager {
    pub fn new(settings: BeamSettings) -> Self {
        Self {
            settings,
            beams: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn settings(&self) -> &BeamSettings {
        &self.settings
    }

    /// Create a beam and build it once against the current level
    pub fn spawn<L, P>(
        &mut self,
        kind: BeamKind,
        damage_per_second: i32,
        life_total: f64,
        seeds: &[SeedSegment],
        level: &L,
        paddle: &mut P,
    ) -> Result<BeamId>
    where
        L: BeamLevel + ?Sized,
        P: BeamPaddle + ?Sized,
    {
        if seeds.is_empty() {
            return Err(BeamError::NoSeeds);
        }

        let id = BeamId(self.next_id);
        let mut beam = Beam::try_new(id, kind, damage_per_second, life_total, self.settings)?;
        self.next_id += 1;

        beam.rebuild(seeds, level, paddle);
        log::info!(
            "Spawned {:?} beam {:?}: {} segments, {} dps, life {}s",
            kind,
            id,
            beam.segments().len(),
            damage_per_second,
            life_total
        );
        self.events.push(BeamEvent::Spawned {
            beam: id,
            segments: snapshot(beam.segments()),
        });
        self.beams.push(beam);
        Ok(id)
    }

    /// Rebuild one beam from fresh seeds. `None` if the beam is gone or
    /// `seeds` is empty.
    pub fn rebuild<L, P>(
        &mut self,
        id: BeamId,
        seeds: &[SeedSegment],
        level: &L,
        paddle: &mut P,
    ) -> Option<RebuildOutcome>
    where
        L: BeamLevel + ?Sized,
        P: BeamPaddle + ?Sized,
    {
        if seeds.is_empty() {
            return None;
        }
        let beam = self.beams.iter_mut().find(|b| b.id() == id)?;
        let outcome = beam.rebuild(seeds, level, paddle);
        if outcome != RebuildOutcome::Unchanged {
            self.events.push(BeamEvent::Changed {
                beam: id,
                segments: snapshot(beam.segments()),
            });
        }
        Some(outcome)
    }

    /// Rebuild a paddle laser from the paddle's current pose. The beam's base
    /// damage follows the flat-top width and every seed carries it.
    pub fn rebuild_paddle_laser<L, P>(
        &mut self,
        id: BeamId,
        emitter: &mut PaddleLaserEmitter,
        pose: &PaddlePose,
        level: &L,
        paddle: &mut P,
    ) -> Result<Option<RebuildOutcome>>
    where
        L: BeamLevel + ?Sized,
        P: BeamPaddle + ?Sized,
    {
        let Some(beam) = self.get_mut(id) else {
            return Ok(None);
        };
        beam.set_base_damage_per_second(PaddleLaserEmitter::base_damage(pose));
        let seeds = emitter.seeds(pose, beam.base_damage_per_second())?;
        Ok(self.rebuild(id, &seeds, level, paddle))
    }

    /// Advance every beam; dead ones are removed and returned
    pub fn tick(&mut self, dt: f64) -> Vec<BeamId> {
        let mut dead = Vec::new();
        for beam in &mut self.beams {
            if beam.tick(dt) {
                dead.push(beam.id());
            }
        }
        for &id in &dead {
            self.remove(id);
        }
        dead
    }

    /// Remove a beam before its lifetime is up
    pub fn remove(&mut self, id: BeamId) -> Option<Beam> {
        let index = self.beams.iter().position(|b| b.id() == id)?;
        let beam = self.beams.remove(index);
        log::info!("Removed beam {:?} after {:.2}s", id, beam.life_elapsed());
        self.events.push(BeamEvent::Removed { beam: id });
        Some(beam)
    }

    pub fn clear(&mut self) {
        let ids: Vec<_> = self.beams.iter().map(Beam::id).collect();
        for id in ids {
            self.remove(id);
        }
    }

    pub fn get(&self, id: BeamId) -> Option<&Beam> {
        self.beams.iter().find(|b| b.id() == id)
    }

    pub fn get_mut(&mut self, id: BeamId) -> Option<&mut Beam> {
        self.beams.iter_mut().find(|b| b.id() == id)
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// Damage every beam deals over `dt`
    pub fn damage_contacts(&self, dt: f64) -> Vec<BeamContact> {
        self.beams.iter().flat_map(|b| b.damage_contacts(dt)).collect()
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<BeamEvent> {
        std::mem::take(&mut self.events)
    }
}
