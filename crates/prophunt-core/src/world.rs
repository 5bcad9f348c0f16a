use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::adapters::{Kit, SavedState, StandInId, StandInPose, World};
use crate::disguise::PropKind;
use crate::effects::{ActiveEffect, EffectKind, StatusEffect};
use crate::geometry::{BlockPos, Location};
use crate::participant::ParticipantId;

const DEFAULT_HEALTH: f64 = 20.0;
const DEFAULT_BLOCK: &str = "STONE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub location: Location,
    pub health: f64,
    pub max_health: f64,
    pub effects: Vec<ActiveEffect>,
    pub kits: Vec<Kit>,
}

impl Body {
    fn at(location: Location) -> Self {
        Self {
            location,
            health: DEFAULT_HEALTH,
            max_health: DEFAULT_HEALTH,
            effects: Vec::new(),
            kits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StandIn {
    pub owner: ParticipantId,
    pub kind: PropKind,
    pub pose: StandInPose,
    pub glowing: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    location: Location,
    health: f64,
    max_health: f64,
}

/// World with no terrain: every block is solid unless overridden.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    bodies: HashMap<ParticipantId, Body>,
    stand_ins: HashMap<StandInId, StandIn>,
    next_stand_in: StandInId,
    blocks: HashMap<BlockPos, Option<String>>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_body(&mut self, id: ParticipantId, location: Location) {
        self.bodies.insert(id, Body::at(location));
    }

    pub fn remove_body(&mut self, id: ParticipantId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    pub fn body(&self, id: ParticipantId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn stand_in(&self, id: StandInId) -> Option<&StandIn> {
        self.stand_ins.get(&id)
    }

    pub fn stand_in_count(&self) -> usize {
        self.stand_ins.len()
    }

    /// `None` makes the block air.
    pub fn set_block(&mut self, pos: BlockPos, material: Option<&str>) {
        self.blocks.insert(pos, material.map(str::to_string));
    }

    pub fn kits(&self, id: ParticipantId) -> &[Kit] {
        self.bodies.get(&id).map_or(&[], |b| b.kits.as_slice())
    }

    /// Advance effect timers by `dt` seconds and drop expired ones.
    pub fn tick(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            for effect in &mut body.effects {
                effect.tick(dt);
            }
            body.effects.retain(|e| !e.is_expired());
        }
    }

    fn body_mut(&mut self, id: ParticipantId) -> &mut Body {
        self.bodies
            .entry(id)
            .or_insert_with(|| Body::at(Location::default()))
    }
}

impl World for InMemoryWorld {
    fn location(&self, id: ParticipantId) -> Option<Location> {
        self.bodies.get(&id).map(|b| b.location)
    }

    fn teleport(&mut self, id: ParticipantId, to: Location) {
        self.body_mut(id).location = to;
    }

    fn health(&self, id: ParticipantId) -> f64 {
        self.bodies.get(&id).map_or(0.0, |b| b.health)
    }

    fn max_health(&self, id: ParticipantId) -> f64 {
        self.bodies.get(&id).map_or(DEFAULT_HEALTH, |b| b.max_health)
    }

    fn set_health(&mut self, id: ParticipantId, health: f64) {
        let body = self.body_mut(id);
        body.health = health.clamp(0.0, body.max_health);
    }

    fn set_max_health(&mut self, id: ParticipantId, max: f64) {
        let body = self.body_mut(id);
        body.max_health = max;
        body.health = body.health.min(max);
    }

    fn apply_effect(&mut self, id: ParticipantId, effect: StatusEffect) {
        let body = self.body_mut(id);
        body.effects.retain(|e| e.effect.kind != effect.kind);
        body.effects.push(ActiveEffect::new(effect));
    }

    fn remove_effect(&mut self, id: ParticipantId, kind: EffectKind) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.effects.retain(|e| e.effect.kind != kind);
        }
    }

    fn has_effect(&self, id: ParticipantId, kind: EffectKind) -> bool {
        self.bodies
            .get(&id)
            .is_some_and(|b| b.effects.iter().any(|e| e.effect.kind == kind))
    }

    fn spawn_stand_in(
        &mut self,
        owner: ParticipantId,
        kind: &PropKind,
        pose: StandInPose,
    ) -> StandInId {
        self.next_stand_in += 1;
        let id = self.next_stand_in;
        self.stand_ins.insert(
            id,
            StandIn {
                owner,
                kind: kind.clone(),
                pose,
                glowing: false,
            },
        );
        id
    }

    fn update_stand_in(&mut self, stand_in: StandInId, pose: StandInPose) {
        if let Some(s) = self.stand_ins.get_mut(&stand_in) {
            s.pose = pose;
        }
    }

    fn set_stand_in_glowing(&mut self, stand_in: StandInId, glowing: bool) {
        if let Some(s) = self.stand_ins.get_mut(&stand_in) {
            s.glowing = glowing;
        }
    }

    fn remove_stand_in(&mut self, stand_in: StandInId) {
        self.stand_ins.remove(&stand_in);
    }

    fn block_at(&self, pos: BlockPos) -> Option<String> {
        match self.blocks.get(&pos) {
            Some(material) => material.clone(),
            None => Some(DEFAULT_BLOCK.to_string()),
        }
    }

    fn save_state(&mut self, id: ParticipantId) -> SavedState {
        let body = self.body_mut(id);
        let snapshot = Snapshot {
            location: body.location,
            health: body.health,
            max_health: body.max_health,
        };
        SavedState(serde_json::to_value(snapshot).unwrap_or_default())
    }

    fn prepare(&mut self, id: ParticipantId) {
        let body = self.body_mut(id);
        body.effects.clear();
        body.kits.clear();
        body.max_health = DEFAULT_HEALTH;
        body.health = DEFAULT_HEALTH;
    }

    fn restore_state(&mut self, id: ParticipantId, state: SavedState) {
        let body = self.body_mut(id);
        body.effects.clear();
        body.kits.clear();
        match serde_json::from_value::<Snapshot>(state.0) {
            Ok(snapshot) => {
                body.location = snapshot.location;
                body.max_health = snapshot.max_health;
                body.health = snapshot.health;
            }
            Err(e) => {
                tracing::warn!(player = %id, error = %e, "Discarding unreadable saved state");
                body.max_health = DEFAULT_HEALTH;
                body.health = DEFAULT_HEALTH;
            }
        }
    }

    fn equip(&mut self, id: ParticipantId, kit: Kit) {
        let kits = &mut self.body_mut(id).kits;
        if !kits.contains(&kit) {
            kits.push(kit);
        }
    }
}
