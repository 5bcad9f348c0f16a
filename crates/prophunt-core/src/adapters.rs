//! Collaborator contracts the session engine is driven through.
//!
//! The engine owns no world, renderer, or storage. Everything that touches
//! the outside is reached through these traits, bundled into a [`Host`] and
//! passed into every session operation.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::disguise::PropKind;
use crate::effects::{EffectKind, StatusEffect};
use crate::events::{Announcement, Cue};
use crate::geometry::{BlockPos, Location, Position};
use crate::participant::ParticipantId;
use crate::stats::StatsDelta;

/// Handle to a world-visible disguise stand-in.
pub type StandInId = u64;

/// Where and how a stand-in is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandInPose {
    pub location: Location,
    /// Degrees around the vertical axis, in `[0, 360)`.
    pub rotation: f32,
    pub scale: f32,
    /// 0 is opaque, 1 is invisible.
    pub transparency: f32,
}

/// Items handed out at phase changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kit {
    DisguiseSelector,
    TauntItem,
    PropFinder,
}

/// Snapshot of a player's external state taken on join and restored on
/// leave. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState(pub serde_json::Value);

/// Spatial and bodily state of players plus disguise stand-ins.
pub trait World {
    fn location(&self, id: ParticipantId) -> Option<Location>;

    fn teleport(&mut self, id: ParticipantId, to: Location);

    fn health(&self, id: ParticipantId) -> f64;

    fn max_health(&self, id: ParticipantId) -> f64;

    fn set_health(&mut self, id: ParticipantId, health: f64);

    fn set_max_health(&mut self, id: ParticipantId, max: f64);

    fn apply_effect(&mut self, id: ParticipantId, effect: StatusEffect);

    fn remove_effect(&mut self, id: ParticipantId, kind: EffectKind);

    fn has_effect(&self, id: ParticipantId, kind: EffectKind) -> bool;

    /// Spawn a stand-in for `owner`, hidden from the owner itself.
    fn spawn_stand_in(&mut self, owner: ParticipantId, kind: &PropKind, pose: StandInPose)
    -> StandInId;

    fn update_stand_in(&mut self, stand_in: StandInId, pose: StandInPose);

    fn set_stand_in_glowing(&mut self, stand_in: StandInId, glowing: bool);

    fn remove_stand_in(&mut self, stand_in: StandInId);

    /// Material of the block at `pos`, `None` for air.
    fn block_at(&self, pos: BlockPos) -> Option<String>;

    fn save_state(&mut self, id: ParticipantId) -> SavedState;

    /// Clear inventory and effects and heal, ready for the lobby.
    fn prepare(&mut self, id: ParticipantId);

    fn restore_state(&mut self, id: ParticipantId, state: SavedState);

    fn equip(&mut self, id: ParticipantId, kit: Kit);
}

/// Text, titles and cosmetic cues.
pub trait Presentation {
    fn announce(&mut self, recipients: &[ParticipantId], announcement: &Announcement);

    /// Play `cue` at `at`. `listeners` restricts who perceives it; `None`
    /// means anyone in range.
    fn cue(&mut self, listeners: Option<&[ParticipantId]>, at: Position, cue: Cue);
}

/// Fire-and-forget sink for lifetime stats.
pub trait StatsSink {
    fn record(&self, id: ParticipantId, delta: StatsDelta);
}

/// Data handed to [`CombatHook::before_hit`].
#[derive(Debug, Clone, PartialEq)]
pub struct HitContext {
    pub hunter: ParticipantId,
    pub prop: ParticipantId,
    pub damage: f64,
    pub first_reveal: bool,
}

/// Decision returned by a combat hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitDecision {
    Proceed { damage: f64 },
    Veto,
}

/// Extension point consulted before a hit is committed.
pub trait CombatHook {
    fn before_hit(&mut self, ctx: &HitContext) -> HitDecision;
}

/// Hook that lets every hit through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl CombatHook for PassThrough {
    fn before_hit(&mut self, ctx: &HitContext) -> HitDecision {
        HitDecision::Proceed { damage: ctx.damage }
    }
}

/// Monotonic session clock in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Stats sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStats;

impl StatsSink for NullStats {
    fn record(&self, _id: ParticipantId, _delta: StatsDelta) {}
}

/// Presentation that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresentation;

impl Presentation for TracingPresentation {
    fn announce(&mut self, recipients: &[ParticipantId], announcement: &Announcement) {
        tracing::debug!(
            key = announcement.key(),
            recipients = recipients.len(),
            "Announcement"
        );
    }

    fn cue(&mut self, listeners: Option<&[ParticipantId]>, at: Position, cue: Cue) {
        tracing::trace!(
            ?cue,
            x = at.x,
            y = at.y,
            z = at.z,
            listeners = listeners.map(<[_]>::len),
            "Cue"
        );
    }
}

/// Everything a session needs from its surroundings.
pub struct Host {
    pub world: Box<dyn World + Send>,
    pub presentation: Box<dyn Presentation + Send>,
    pub stats: Box<dyn StatsSink + Send>,
    pub combat_hook: Box<dyn CombatHook + Send>,
    pub clock: Box<dyn Clock + Send>,
    pub rng: StdRng,
}

impl Host {
    pub fn new(
        world: Box<dyn World + Send>,
        presentation: Box<dyn Presentation + Send>,
        stats: Box<dyn StatsSink + Send>,
        clock: Box<dyn Clock + Send>,
    ) -> Self {
        Self {
            world,
            presentation,
            stats,
            combat_hook: Box::new(PassThrough),
            clock,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_combat_hook(mut self, hook: Box<dyn CombatHook + Send>) -> Self {
        self.combat_hook = hook;
        self
    }

    /// Deterministic randomness for replays and tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn announce(&mut self, recipients: &[ParticipantId], announcement: Announcement) {
        if recipients.is_empty() {
            return;
        }
        self.presentation.announce(recipients, &announcement);
    }

    pub fn announce_to(&mut self, recipient: ParticipantId, announcement: Announcement) {
        self.presentation.announce(&[recipient], &announcement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_keeps_damage() {
        let ctx = HitContext {
            hunter: uuid::Uuid::nil(),
            prop: uuid::Uuid::nil(),
            damage: 4.0,
            first_reveal: true,
        };
        assert_eq!(
            PassThrough.before_hit(&ctx),
            HitDecision::Proceed { damage: 4.0 }
        );
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
