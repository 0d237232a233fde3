// effects.rs — bounded pool of transient effect particles

use log::warn;

use trx_common::types::Pos3d;

use crate::items::ObjectType;

pub const NUM_EFFECTS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effect {
    pub pos: Pos3d,
    pub room: i16,
    pub object_type: ObjectType,
    pub speed: i16,
    pub fall_speed: i16,
    /// Lifetime or damage carried by the particle.
    pub counter: i16,
    /// Mesh drawn for the particle.
    pub frame_number: usize,
}

#[derive(Debug, Clone)]
pub struct EffectPool {
    slots: Vec<Option<Effect>>,
}

impl Default for EffectPool {
    fn default() -> Self {
        Self::new(NUM_EFFECTS)
    }
}

impl EffectPool {
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity] }
    }

    /// Claim a free slot in `room`, or None when the pool is full.
    pub fn create(&mut self, room: i16) -> Option<usize> {
        let Some(idx) = self.slots.iter().position(Option::is_none) else {
            warn!("effect pool exhausted ({} slots)", self.slots.len());
            return None;
        };
        self.slots[idx] = Some(Effect { room, ..Default::default() });
        Some(idx)
    }

    pub fn kill(&mut self, idx: usize) {
        if let Some(slot) = self.slots.get_mut(idx) {
            *slot = None;
        }
    }

    pub fn get(&self, idx: usize) -> Option<&Effect> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Effect> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    pub fn active(&self) -> impl Iterator<Item = (usize, &Effect)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
