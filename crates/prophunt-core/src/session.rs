//! One arena's round lifecycle.
//!
//! A [`Session`] is plain data. Every operation takes the [`Host`] it should
//! act through, so callers decide how sessions are serialized; the server
//! keeps all of them inside a single tick task.

use serde::Serialize;

use crate::adapters::{Host, Kit};
use crate::arena::Arena;
use crate::disguise::{Disguise, PropKind};
use crate::effects::{EffectKind, StatusEffect};
use crate::error::RejectedAction;
use crate::escalation::Escalation;
use crate::events::{Announcement, Cue};
use crate::participant::{Participant, ParticipantId, Role};
use crate::roster::Roster;
use crate::settings::GameSettings;
use crate::state::GameState;
use crate::team::Team;
use crate::timer::{Countdown, CountdownStep, Scheduler};

/// Players needed for an admin to force a round.
pub const FORCE_START_MIN_PLAYERS: usize = 2;

/// Seconds before the lobby countdown ends during which it is announced.
const LOBBY_ANNOUNCE_FROM: u32 = 10;

/// Which phase the armed countdown belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKey {
    Lobby,
    Hide,
    Seek,
}

/// Deferred work owned by the session scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTask {
    EscapeCheck(ParticipantId),
    ForcedTaunt,
    Reset,
}

/// Read-only view of a participant for status output.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSummary {
    pub id: ParticipantId,
    pub name: String,
    pub team: Team,
    pub points: u32,
    pub disguise: Option<String>,
    pub locked: bool,
    pub revealed: bool,
}

/// Read-only view of a session for status output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub arena: String,
    pub state: GameState,
    pub players: usize,
    pub max_players: usize,
    pub remaining: u32,
    pub time: String,
    pub winner: Option<Team>,
    pub escalation_phase: u8,
    pub alive_props: usize,
    pub alive_hunters: usize,
    pub participants: Vec<ParticipantSummary>,
}

#[derive(Debug)]
pub struct Session {
    pub(crate) arena: Arena,
    pub(crate) settings: GameSettings,
    pub(crate) state: GameState,
    pub(crate) roster: Roster,
    pub(crate) countdown: Countdown<PhaseKey>,
    pub(crate) scheduler: Scheduler<SessionTask>,
    pub(crate) escalation: Escalation,
    pub(crate) winner: Option<Team>,
    pub(crate) started_at: Option<u64>,
}

impl Session {
    /// Create a session for `arena`. `settings` is copied and clamped; later
    /// changes to the arena do not affect this session.
    pub fn new(arena: Arena, settings: GameSettings) -> Self {
        let state = if arena.enabled {
            GameState::Waiting
        } else {
            GameState::Disabled
        };
        Self {
            arena,
            settings: settings.clamped(),
            state,
            roster: Roster::new(),
            countdown: Countdown::new(),
            scheduler: Scheduler::new(),
            escalation: Escalation::default(),
            winner: None,
            started_at: None,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn escalation(&self) -> &Escalation {
        &self.escalation
    }

    /// Seconds left on the armed countdown.
    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.roster.contains(id)
    }

    pub fn can_join(&self) -> bool {
        self.state.is_joinable() && self.roster.len() < self.settings.max_players
    }

    // ================================================================
    // Membership
    // ================================================================

    /// Add a player to the lobby. Saves and prepares their external state,
    /// then starts the countdown once enough players are present.
    pub fn add_player(
        &mut self,
        host: &mut Host,
        id: ParticipantId,
        name: &str,
    ) -> Result<(), RejectedAction> {
        if self.state == GameState::Disabled {
            return Err(RejectedAction::ArenaDisabled);
        }
        if !self.state.is_joinable() {
            return Err(RejectedAction::SessionNotJoinable);
        }
        if self.roster.contains(id) {
            return Err(RejectedAction::AlreadyInGame);
        }
        if self.roster.len() >= self.settings.max_players {
            return Err(RejectedAction::SessionFull);
        }

        let mut participant = Participant::new(id, name, host.now_ms());
        participant.saved_state = Some(host.world.save_state(id));
        host.world.prepare(id);
        self.roster.add(participant);
        if let Some(spawn) = self.arena.lobby_spawn {
            host.world.teleport(id, spawn);
        }

        tracing::info!(
            arena = %self.arena.name,
            player = %id,
            players = self.roster.len(),
            "Player joined session"
        );
        let everyone = self.roster.ids();
        host.announce(
            &everyone,
            Announcement::PlayerJoined {
                player: name.to_string(),
                current: self.roster.len(),
                max: self.settings.max_players,
            },
        );

        if self.roster.len() >= self.settings.min_players {
            self.start_countdown(host);
        }
        Ok(())
    }

    /// Remove a player, restoring their external state.
    pub fn remove_player(
        &mut self,
        host: &mut Host,
        id: ParticipantId,
    ) -> Result<(), RejectedAction> {
        let participant = self.roster.remove(id).ok_or(RejectedAction::NotInGame)?;
        self.scheduler
            .cancel_where(|t| *t == SessionTask::EscapeCheck(id));
        let name = participant.name.clone();
        self.release(host, participant);

        tracing::info!(
            arena = %self.arena.name,
            player = %id,
            players = self.roster.len(),
            "Player left session"
        );
        let everyone = self.roster.ids();
        host.announce(
            &everyone,
            Announcement::PlayerLeft {
                player: name,
                current: self.roster.len(),
                max: self.settings.max_players,
            },
        );

        if self.state.is_in_progress() {
            self.check_round_end(host);
        } else if self.state == GameState::Starting
            && self.roster.len() < self.settings.min_players
        {
            self.cancel_countdown(host);
        }
        Ok(())
    }

    /// Record a pre-round team preference.
    pub fn select_team(&mut self, id: ParticipantId, choice: Team) -> Result<(), RejectedAction> {
        if !self.roster.contains(id) {
            return Err(RejectedAction::NotInGame);
        }
        if !matches!(self.state, GameState::Waiting | GameState::Starting) {
            return Err(RejectedAction::WrongPhase);
        }
        if !choice.is_playable() {
            return Err(RejectedAction::InvalidTeamChoice);
        }
        self.roster.set_choice(id, Some(choice));
        Ok(())
    }

    /// Drop a participant's disguise and give back their saved state.
    fn release(&mut self, host: &mut Host, participant: Participant) {
        let id = participant.id;
        if let Role::Prop(prop) = participant.role
            && let Some(disguise) = prop.disguise
        {
            disguise.remove(host.world.as_mut(), id, self.settings.prop_health);
        }
        if let Some(saved) = participant.saved_state {
            host.world.restore_state(id, saved);
        }
    }

    // ================================================================
    // Admin
    // ================================================================

    /// Skip the lobby countdown and begin the round now.
    pub fn force_start(&mut self, host: &mut Host) -> Result<(), RejectedAction> {
        if !matches!(self.state, GameState::Waiting | GameState::Starting) {
            return Err(RejectedAction::WrongPhase);
        }
        if self.roster.len() < FORCE_START_MIN_PLAYERS {
            return Err(RejectedAction::NotEnoughPlayers(FORCE_START_MIN_PLAYERS));
        }
        self.arena.check_ready()?;
        self.countdown.stop();
        tracing::info!(arena = %self.arena.name, "Round force-started");
        self.begin_round(host);
        Ok(())
    }

    /// Cancel everything and reset to an empty lobby immediately.
    /// Calling it again has no further effect.
    pub fn force_stop(&mut self, host: &mut Host) {
        if !self.roster.is_empty() {
            let everyone = self.roster.ids();
            host.announce(&everyone, Announcement::ForceStopped);
            tracing::info!(arena = %self.arena.name, state = %self.state, "Session force-stopped");
        }
        self.reset(host);
    }

    pub fn set_enabled(&mut self, host: &mut Host, enabled: bool) {
        self.arena.enabled = enabled;
        if enabled {
            if self.state == GameState::Disabled {
                self.transition(GameState::Waiting);
            }
        } else if self.state != GameState::Disabled {
            self.force_stop(host);
            self.transition(GameState::Disabled);
        }
    }

    /// Extend the armed countdown. Escalation phases already reached stay
    /// active.
    pub fn add_time(&mut self, seconds: u32) {
        self.countdown.add_time(seconds);
    }

    pub fn remove_time(&mut self, seconds: u32) {
        self.countdown.remove_time(seconds);
    }

    // ================================================================
    // Clock
    // ================================================================

    /// One-second step: countdown first, then escalation, then due tasks.
    pub fn tick(&mut self, host: &mut Host) {
        self.advance_countdown(host);
        if self.state == GameState::Hunting {
            self.run_escalation(host);
        }
        self.run_due_tasks(host);
    }

    /// Per-frame disguise sync for every alive prop.
    pub fn sync_disguises(&mut self, host: &mut Host) {
        if !self.state.is_in_progress() {
            return;
        }
        for id in self.roster.props().to_vec() {
            if let Some(disguise) = self
                .roster
                .get_mut(id)
                .and_then(|p| p.prop_mut())
                .and_then(|p| p.disguise.as_mut())
            {
                disguise.sync(host.world.as_mut(), id);
            }
        }
    }

    fn start_phase_countdown(&mut self, host: &mut Host, key: PhaseKey, seconds: u32) {
        self.countdown.start(key, seconds);
        self.advance_countdown(host);
    }

    fn advance_countdown(&mut self, host: &mut Host) {
        let Some(step) = self.countdown.tick() else {
            return;
        };
        match step {
            CountdownStep {
                key: PhaseKey::Lobby,
                completed: true,
                ..
            } => self.begin_round(host),
            CountdownStep {
                key: PhaseKey::Lobby,
                remaining,
                ..
            } => self.lobby_tick(host, remaining),
            CountdownStep {
                key: PhaseKey::Hide,
                completed: true,
                ..
            } => self.start_hunting(host),
            CountdownStep {
                key: PhaseKey::Hide,
                remaining,
                ..
            } => self.hide_tick(host, remaining),
            CountdownStep {
                key: PhaseKey::Seek,
                completed: true,
                ..
            } => self.end_round(host, Team::Props),
            CountdownStep {
                key: PhaseKey::Seek,
                remaining,
                ..
            } => self.seek_tick(host, remaining),
        }
    }

    fn run_due_tasks(&mut self, host: &mut Host) {
        for task in self.scheduler.due(host.now_ms()) {
            match task {
                SessionTask::EscapeCheck(id) => self.check_escape(host, id),
                SessionTask::ForcedTaunt => self.forced_taunt(host),
                SessionTask::Reset => self.reset(host),
            }
        }
    }

    // ================================================================
    // Phases
    // ================================================================

    fn transition(&mut self, to: GameState) -> bool {
        if !self.state.can_transition(to) {
            tracing::warn!(
                arena = %self.arena.name,
                from = ?self.state,
                to = ?to,
                "Refusing invalid state transition"
            );
            return false;
        }
        tracing::debug!(arena = %self.arena.name, from = %self.state, to = %to, "Session state changed");
        self.state = to;
        true
    }

    fn start_countdown(&mut self, host: &mut Host) {
        if self.state != GameState::Waiting || !self.transition(GameState::Starting) {
            return;
        }
        let seconds = self.settings.lobby_countdown;
        self.start_phase_countdown(host, PhaseKey::Lobby, seconds);
    }

    fn cancel_countdown(&mut self, host: &mut Host) {
        self.countdown.stop();
        if self.transition(GameState::Waiting) {
            let everyone = self.roster.ids();
            host.announce(&everyone, Announcement::CountdownCancelled);
        }
    }

    fn lobby_tick(&mut self, host: &mut Host, remaining: u32) {
        if remaining == 0 || remaining > LOBBY_ANNOUNCE_FROM {
            return;
        }
        let waiting = self.roster.waiting().to_vec();
        host.announce(&waiting, Announcement::GameStarting { seconds: remaining });
        let cue = if remaining <= 3 {
            Cue::CountdownFinal
        } else {
            Cue::CountdownTick
        };
        for id in waiting {
            if let Some(loc) = host.world.location(id) {
                host.presentation.cue(Some(&[id]), loc.pos, cue);
            }
        }
    }

    /// Assign teams and send everyone to their start positions.
    fn begin_round(&mut self, host: &mut Host) {
        if !self.transition(GameState::Hiding) {
            return;
        }
        self.countdown.stop();
        self.started_at = Some(host.now_ms());
        self.winner = None;
        self.escalation.reset();
        self.roster.assign(&self.settings, &mut host.rng);

        for id in self.roster.props().to_vec() {
            self.setup_prop(host, id);
        }
        for id in self.roster.hunters().to_vec() {
            self.setup_hunter(host, id);
        }
        tracing::info!(
            arena = %self.arena.name,
            props = self.roster.props().len(),
            hunters = self.roster.hunters().len(),
            "Round started"
        );
        let seconds = self.settings.hide_time;
        self.start_phase_countdown(host, PhaseKey::Hide, seconds);
    }

    fn setup_prop(&mut self, host: &mut Host, id: ParticipantId) {
        match self.arena.random_prop_spawn(&mut host.rng) {
            Some(spawn) => host.world.teleport(id, spawn),
            None => tracing::warn!(arena = %self.arena.name, "No prop spawn; leaving prop in place"),
        }
        host.world.equip(id, Kit::DisguiseSelector);
        if let Some(kind) = self.arena.random_prop(&mut host.rng) {
            let disguise = Disguise::apply(host.world.as_mut(), id, kind);
            if let Some(prop) = self.roster.get_mut(id).and_then(|p| p.prop_mut()) {
                prop.disguise = Some(disguise);
            }
        }
        host.announce_to(id, Announcement::TeamReveal { team: Team::Props });
        if let Some(loc) = host.world.location(id) {
            host.presentation.cue(Some(&[id]), loc.pos, Cue::GameStart);
        }
    }

    fn setup_hunter(&mut self, host: &mut Host, id: ParticipantId) {
        match self.arena.random_hunter_spawn(&mut host.rng) {
            Some(spawn) => host.world.teleport(id, spawn),
            None => tracing::warn!(arena = %self.arena.name, "No hunter spawn; leaving hunter in place"),
        }
        host.world.set_max_health(id, self.settings.hunter_health);
        host.world.set_health(id, self.settings.hunter_health);
        for effect in StatusEffect::caged(self.settings.hide_time) {
            host.world.apply_effect(id, effect);
        }
        host.announce_to(id, Announcement::TeamReveal { team: Team::Hunters });
        if let Some(loc) = host.world.location(id) {
            host.presentation.cue(Some(&[id]), loc.pos, Cue::GameStart);
        }
    }

    fn hide_tick(&mut self, host: &mut Host, remaining: u32) {
        if matches!(remaining, 10 | 5 | 1..=3) {
            let props = self.roster.props().to_vec();
            host.announce(&props, Announcement::HidePhase { seconds: remaining });
        }
    }

    /// Release the hunters and start the seek clock.
    fn start_hunting(&mut self, host: &mut Host) {
        if !self.transition(GameState::Hunting) {
            return;
        }
        for id in self.roster.hunters().to_vec() {
            host.world.remove_effect(id, EffectKind::Blindness);
            host.world.remove_effect(id, EffectKind::Slowness);
            if let Some(spawn) = self.arena.random_hunter_spawn(&mut host.rng) {
                host.world.teleport(id, spawn);
            }
            host.world.equip(id, Kit::PropFinder);
        }
        for id in self.roster.props().to_vec() {
            host.world.equip(id, Kit::TauntItem);
        }
        let alive: Vec<_> = self
            .roster
            .props()
            .iter()
            .chain(self.roster.hunters())
            .copied()
            .collect();
        host.announce(&alive, Announcement::HuntersReleased);
        for id in &alive {
            if let Some(loc) = host.world.location(*id) {
                host.presentation.cue(Some(&[*id]), loc.pos, Cue::HuntersReleased);
            }
        }

        let interval = u64::from(self.settings.forced_taunt_interval) * 1000;
        if interval > 0 {
            self.scheduler
                .run_repeating(host.now_ms(), interval, interval, SessionTask::ForcedTaunt);
        }
        tracing::info!(arena = %self.arena.name, "Hunters released");
        let seconds = self.settings.seek_time;
        self.start_phase_countdown(host, PhaseKey::Seek, seconds);
    }

    fn seek_tick(&mut self, host: &mut Host, remaining: u32) {
        if matches!(remaining, 120 | 60 | 30) {
            let everyone = self.roster.ids();
            host.announce(&everyone, Announcement::TimeWarning { seconds: remaining });
        }
    }

    /// Win check after an elimination or a leave.
    pub(crate) fn check_round_end(&mut self, host: &mut Host) {
        if !self.state.is_in_progress() {
            return;
        }
        let winner = self.roster.winner();
        self.conclude(host, winner);
    }

    /// Act on a win-check result computed earlier in the same step.
    pub(crate) fn conclude(&mut self, host: &mut Host, winner: Option<Team>) {
        if !self.state.is_in_progress() {
            return;
        }
        match winner {
            Some(team) => self.end_round(host, team),
            None if self.roster.props().is_empty() && self.roster.hunters().is_empty() => {
                self.reset(host);
            }
            None => {}
        }
    }

    /// Announce the result, hand out awards and schedule the reset.
    pub(crate) fn end_round(&mut self, host: &mut Host, winner: Team) {
        if matches!(self.state, GameState::Ending | GameState::Disabled)
            || !self.transition(GameState::Ending)
        {
            return;
        }
        self.countdown.stop();
        self.scheduler.cancel_where(|t| *t != SessionTask::Reset);
        self.winner = Some(winner);

        let everyone = self.roster.ids();
        host.announce(&everyone, Announcement::RoundOver { winner });
        for id in &everyone {
            let won = self.roster.get(*id).is_some_and(|p| p.side() == winner);
            let (announcement, cue) = if won {
                (Announcement::Victory { winner }, Cue::Victory)
            } else {
                (Announcement::Defeat { winner }, Cue::Defeat)
            };
            host.announce_to(*id, announcement);
            if let Some(loc) = host.world.location(*id) {
                host.presentation.cue(Some(&[*id]), loc.pos, cue);
            }
        }

        self.award_round(host, winner);
        tracing::info!(arena = %self.arena.name, winner = %winner, "Round ended");
        let delay = u64::from(self.settings.end_delay) * 1000;
        self.scheduler
            .run_delayed(host.now_ms(), delay, SessionTask::Reset);
    }

    /// Return every participant to their saved state and empty the session.
    pub(crate) fn reset(&mut self, host: &mut Host) {
        self.countdown.stop();
        self.scheduler.clear();
        for id in self.roster.ids() {
            if let Some(participant) = self.roster.remove(id) {
                self.release(host, participant);
            }
        }
        self.roster.clear();
        self.winner = None;
        self.started_at = None;
        self.escalation.reset();
        if !matches!(self.state, GameState::Waiting | GameState::Disabled) {
            self.transition(GameState::Waiting);
        }
    }

    // ================================================================
    // Prop commands
    // ================================================================

    /// Alive prop `id`, or the reason it cannot act.
    pub(crate) fn require_prop(&self, id: ParticipantId) -> Result<(), RejectedAction> {
        if !self.roster.contains(id) {
            return Err(RejectedAction::NotInGame);
        }
        if !self.state.is_in_progress() {
            return Err(RejectedAction::WrongPhase);
        }
        if !self.roster.is_alive_prop(id) {
            return Err(RejectedAction::NotAProp);
        }
        Ok(())
    }

    /// Switch to another prop from the arena catalog. Costs one change.
    pub fn change_disguise(
        &mut self,
        host: &mut Host,
        id: ParticipantId,
        material: &str,
    ) -> Result<PropKind, RejectedAction> {
        self.require_prop(id)?;
        let kind = self
            .arena
            .catalog_prop(material)
            .cloned()
            .ok_or_else(|| RejectedAction::PropNotAllowed(material.to_string()))?;
        let now = host.now_ms();
        let cooldown = self.settings.prop_change_cooldown;
        let glow = self.escalation.is_active(3);
        let restored = self.settings.prop_health;

        let prop = self
            .roster
            .get_mut(id)
            .and_then(|p| p.prop_mut())
            .ok_or(RejectedAction::NotAProp)?;
        if prop.changes_remaining == 0 {
            return Err(RejectedAction::NoDisguiseChangesLeft);
        }
        if let Some(left) = prop.change_cooldown_left(now, cooldown) {
            return Err(RejectedAction::DisguiseOnCooldown(left));
        }

        if let Some(old) = prop.disguise.take() {
            old.remove(host.world.as_mut(), id, restored);
        }
        let mut disguise = Disguise::apply(host.world.as_mut(), id, kind.clone());
        if glow || prop.revealed {
            disguise.set_glowing(host.world.as_mut(), true);
        }
        prop.disguise = Some(disguise);
        prop.record_change(now);
        let left = prop.changes_remaining;

        tracing::debug!(player = %id, material = %kind.material, left, "Disguise changed");
        host.announce_to(
            id,
            Announcement::Disguised {
                material: kind.display_name(),
            },
        );
        if let Some(loc) = host.world.location(id) {
            host.presentation.cue(None, loc.pos, Cue::Disguise);
        }
        Ok(kind)
    }

    /// Lock or unlock the disguise in place. Returns the new lock state.
    pub fn toggle_lock(&mut self, host: &mut Host, id: ParticipantId) -> Result<bool, RejectedAction> {
        self.require_prop(id)?;
        if !self.settings.can_lock {
            return Err(RejectedAction::LockingDisabled);
        }
        let disguise = self
            .roster
            .get_mut(id)
            .and_then(|p| p.prop_mut())
            .and_then(|p| p.disguise.as_mut())
            .ok_or(RejectedAction::NoDisguise)?;
        // Lock where the player stands now, not where the last frame left it.
        disguise.sync(host.world.as_mut(), id);
        let locked = !disguise.is_locked();
        disguise.set_locked(host.world.as_mut(), locked);

        let (announcement, cue) = if locked {
            (Announcement::Locked, Cue::Lock)
        } else {
            (Announcement::Unlocked, Cue::Unlock)
        };
        host.announce_to(id, announcement);
        if let Some(loc) = host.world.location(id) {
            host.presentation.cue(Some(&[id]), loc.pos, cue);
        }
        Ok(locked)
    }

    /// Turn the prop and its stand-in by `degrees`. Returns the new rotation.
    pub fn rotate_disguise(
        &mut self,
        host: &mut Host,
        id: ParticipantId,
        degrees: f32,
    ) -> Result<f32, RejectedAction> {
        self.require_prop(id)?;
        let disguise = self
            .roster
            .get_mut(id)
            .and_then(|p| p.prop_mut())
            .and_then(|p| p.disguise.as_mut())
            .ok_or(RejectedAction::NoDisguise)?;
        disguise.rotate(host.world.as_mut(), degrees);
        let rotation = disguise.rotation();
        if let Some(loc) = host.world.location(id) {
            host.world.teleport(id, loc.with_yaw(rotation));
        }
        Ok(rotation)
    }

    // ================================================================
    // Status
    // ================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut participants: Vec<ParticipantSummary> = self
            .roster
            .ids()
            .into_iter()
            .filter_map(|id| self.roster.get(id))
            .map(|p| {
                let prop = p.prop();
                let disguise = prop.and_then(|s| s.disguise.as_ref());
                ParticipantSummary {
                    id: p.id,
                    name: p.name.clone(),
                    team: p.team,
                    points: p.points,
                    disguise: disguise.map(|d| d.kind().material.clone()),
                    locked: disguise.is_some_and(Disguise::is_locked),
                    revealed: prop.is_some_and(|s| s.revealed),
                }
            })
            .collect();
        participants.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));

        SessionSnapshot {
            arena: self.arena.name.clone(),
            state: self.state,
            players: self.roster.len(),
            max_players: self.settings.max_players,
            remaining: self.countdown.remaining(),
            time: self.countdown.formatted(),
            winner: self.winner,
            escalation_phase: self.escalation.phase(),
            alive_props: self.roster.props().len(),
            alive_hunters: self.roster.hunters().len(),
            participants,
        }
    }
}
