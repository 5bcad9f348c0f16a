use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::adapters::{
    Clock, Host, Kit, Presentation, SavedState, StandInId, StandInPose, StatsSink, World,
};
use crate::arena::Arena;
use crate::disguise::PropKind;
use crate::effects::{EffectKind, StatusEffect};
use crate::events::{Announcement, Cue};
use crate::geometry::{BlockPos, Location, Position, Region};
use crate::participant::ParticipantId;
use crate::session::Session;
use crate::state::GameState;
use crate::stats::StatsDelta;
use crate::world::InMemoryWorld;

/// Clock advanced by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// An [`InMemoryWorld`] the test can inspect while the host owns it.
#[derive(Debug, Clone, Default)]
pub struct SharedWorld(pub Arc<Mutex<InMemoryWorld>>);

impl SharedWorld {
    pub fn lock(&self) -> MutexGuard<'_, InMemoryWorld> {
        self.0.lock().expect("world lock poisoned")
    }
}

impl World for SharedWorld {
    fn location(&self, id: ParticipantId) -> Option<Location> {
        self.lock().location(id)
    }
    fn teleport(&mut self, id: ParticipantId, to: Location) {
        self.lock().teleport(id, to);
    }
    fn health(&self, id: ParticipantId) -> f64 {
        self.lock().health(id)
    }
    fn max_health(&self, id: ParticipantId) -> f64 {
        self.lock().max_health(id)
    }
    fn set_health(&mut self, id: ParticipantId, health: f64) {
        self.lock().set_health(id, health);
    }
    fn set_max_health(&mut self, id: ParticipantId, max: f64) {
        self.lock().set_max_health(id, max);
    }
    fn apply_effect(&mut self, id: ParticipantId, effect: StatusEffect) {
        self.lock().apply_effect(id, effect);
    }
    fn remove_effect(&mut self, id: ParticipantId, kind: EffectKind) {
        self.lock().remove_effect(id, kind);
    }
    fn has_effect(&self, id: ParticipantId, kind: EffectKind) -> bool {
        self.lock().has_effect(id, kind)
    }
    fn spawn_stand_in(&mut self, owner: ParticipantId, kind: &PropKind, pose: StandInPose) -> StandInId {
        self.lock().spawn_stand_in(owner, kind, pose)
    }
    fn update_stand_in(&mut self, stand_in: StandInId, pose: StandInPose) {
        self.lock().update_stand_in(stand_in, pose);
    }
    fn set_stand_in_glowing(&mut self, stand_in: StandInId, glowing: bool) {
        self.lock().set_stand_in_glowing(stand_in, glowing);
    }
    fn remove_stand_in(&mut self, stand_in: StandInId) {
        self.lock().remove_stand_in(stand_in);
    }
    fn block_at(&self, pos: BlockPos) -> Option<String> {
        self.lock().block_at(pos)
    }
    fn save_state(&mut self, id: ParticipantId) -> SavedState {
        self.lock().save_state(id)
    }
    fn prepare(&mut self, id: ParticipantId) {
        self.lock().prepare(id);
    }
    fn restore_state(&mut self, id: ParticipantId, state: SavedState) {
        self.lock().restore_state(id, state);
    }
    fn equip(&mut self, id: ParticipantId, kit: Kit) {
        self.lock().equip(id, kit);
    }
}

/// A cue as it was played.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedCue {
    pub listeners: Option<Vec<ParticipantId>>,
    pub at: Position,
    pub cue: Cue,
}

/// Presentation that keeps everything it was asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    announcements: Arc<Mutex<Vec<(Vec<ParticipantId>, Announcement)>>>,
    cues: Arc<Mutex<Vec<PlayedCue>>>,
}

impl RecordingPresentation {
    /// Number of announce calls with this key.
    pub fn count(&self, key: &str) -> usize {
        self.announcements
            .lock()
            .expect("presentation lock poisoned")
            .iter()
            .filter(|(_, a)| a.key() == key)
            .count()
    }

    /// Recipient lists of every announce call with this key.
    pub fn recipients(&self, key: &str) -> Vec<Vec<ParticipantId>> {
        self.announcements
            .lock()
            .expect("presentation lock poisoned")
            .iter()
            .filter(|(_, a)| a.key() == key)
            .map(|(to, _)| to.clone())
            .collect()
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.announcements
            .lock()
            .expect("presentation lock poisoned")
            .iter()
            .map(|(_, a)| a.clone())
            .collect()
    }

    pub fn cue_count(&self, cue: Cue) -> usize {
        self.cues
            .lock()
            .expect("presentation lock poisoned")
            .iter()
            .filter(|c| c.cue == cue)
            .count()
    }

    pub fn cues(&self) -> Vec<PlayedCue> {
        self.cues.lock().expect("presentation lock poisoned").clone()
    }
}

impl Presentation for RecordingPresentation {
    fn announce(&mut self, recipients: &[ParticipantId], announcement: &Announcement) {
        self.announcements
            .lock()
            .expect("presentation lock poisoned")
            .push((recipients.to_vec(), announcement.clone()));
    }

    fn cue(&mut self, listeners: Option<&[ParticipantId]>, at: Position, cue: Cue) {
        self.cues
            .lock()
            .expect("presentation lock poisoned")
            .push(PlayedCue {
                listeners: listeners.map(<[_]>::to_vec),
                at,
                cue,
            });
    }
}

/// Stats sink that keeps every delta.
#[derive(Debug, Clone, Default)]
pub struct RecordingStats(Arc<Mutex<Vec<(ParticipantId, StatsDelta)>>>);

impl RecordingStats {
    pub fn deltas(&self) -> Vec<(ParticipantId, StatsDelta)> {
        self.0.lock().expect("stats lock poisoned").clone()
    }
}

impl StatsSink for RecordingStats {
    fn record(&self, id: ParticipantId, delta: StatsDelta) {
        self.0.lock().expect("stats lock poisoned").push((id, delta));
    }
}

/// A fully set up arena allowing 2 to 4 players.
pub fn ready_arena(name: &str) -> Arena {
    let mut arena = Arena::new(name);
    arena
        .set_region(Region::from_corners(
            BlockPos::new(0, 60, 0),
            BlockPos::new(63, 80, 63),
        ))
        .expect("test region within scan limit");
    arena.lobby_spawn = Some(Location::at(0.5, 90.0, 0.5));
    arena.set_hunter_cage(Region::from_corners(
        BlockPos::new(-10, 60, -10),
        BlockPos::new(-5, 64, -5),
    ));
    arena.prop_spawns.push(Location::at(10.5, 64.0, 10.5));
    arena.hunter_spawns.push(Location::at(30.5, 64.0, 30.5));
    for material in ["BARREL", "CHEST", "OAK_LOG", "TORCH", "FLOWER_POT"] {
        arena.add_prop(PropKind::new(material));
    }
    arena.settings.min_players = 2;
    arena.settings.max_players = 4;
    arena
}

/// A host wired to shared test collaborators.
pub fn test_host(
    world: &SharedWorld,
    clock: &ManualClock,
    presentation: &RecordingPresentation,
    stats: &RecordingStats,
) -> Host {
    Host::new(
        Box::new(world.clone()),
        Box::new(presentation.clone()),
        Box::new(stats.clone()),
        Box::new(clock.clone()),
    )
    .with_seed(7)
}

/// One session plus handles on everything its host touches.
pub struct Harness {
    pub session: Session,
    pub host: Host,
    pub shared_world: SharedWorld,
    pub clock: ManualClock,
    pub presentation: RecordingPresentation,
    pub stats: RecordingStats,
    joined: usize,
}

impl Harness {
    pub fn new(arena: Arena) -> Self {
        let shared_world = SharedWorld::default();
        let clock = ManualClock::default();
        let presentation = RecordingPresentation::default();
        let stats = RecordingStats::default();
        let host = test_host(&shared_world, &clock, &presentation, &stats);
        let settings = arena.settings.clone();
        Self {
            session: Session::new(arena, settings),
            host,
            shared_world,
            clock,
            presentation,
            stats,
            joined: 0,
        }
    }

    /// A session already in HUNTING with `players` participants.
    pub fn hunting(players: usize) -> Self {
        Self::hunting_in(ready_arena("arena"), players)
    }

    pub fn hunting_in(mut arena: Arena, players: usize) -> Self {
        arena.settings.min_players = players.max(2);
        arena.settings.max_players = arena.settings.max_players.max(players);
        let mut h = Self::new(arena);
        h.join(players);
        h.session
            .force_start(&mut h.host)
            .expect("force start in harness");
        let hide = h.session.settings().hide_time;
        h.tick_seconds(hide);
        assert_eq!(h.session.state(), GameState::Hunting);
        h
    }

    /// Join `n` fresh players standing somewhere outside the arena.
    pub fn join(&mut self, n: usize) -> Vec<ParticipantId> {
        (0..n)
            .map(|_| {
                self.joined += 1;
                let id = Uuid::new_v4();
                self.world()
                    .spawn_body(id, Location::at(-100.0, 64.0, self.joined as f64));
                self.session
                    .add_player(&mut self.host, id, &format!("Player{}", self.joined))
                    .expect("join in harness");
                id
            })
            .collect()
    }

    /// Advance the clock one second at a time, ticking after each.
    pub fn tick_seconds(&mut self, seconds: u32) {
        for _ in 0..seconds {
            self.clock.advance(1000);
            self.session.tick(&mut self.host);
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.clock.advance(ms);
    }

    pub fn world(&self) -> MutexGuard<'_, InMemoryWorld> {
        self.shared_world.lock()
    }

    pub fn stand_in_of(&self, id: ParticipantId) -> StandInId {
        self.session
            .roster()
            .get(id)
            .and_then(|p| p.prop())
            .and_then(|p| p.disguise.as_ref())
            .map(|d| d.stand_in())
            .expect("participant has a disguise")
    }
}
