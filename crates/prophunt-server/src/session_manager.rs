use std::collections::HashMap;

use serde::Serialize;

use prophunt_core::disguise::PropKind;
use prophunt_core::geometry::Location;
use prophunt_core::{
    Arena, AttackOutcome, AttackTarget, Host, ParticipantId, RejectedAction, Session,
    SessionSnapshot, Team,
};

/// Server-wide summary for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub arenas: usize,
    pub active_sessions: usize,
    pub total_players: usize,
    pub sessions: Vec<SessionSnapshot>,
}

/// Owns every arena, its session, and the host the sessions act through.
///
/// Sessions are created lazily on first use and keyed by lowercase arena
/// name. A player belongs to at most one session at a time.
pub struct SessionManager {
    arenas: HashMap<String, Arena>,
    sessions: HashMap<String, Session>,
    /// player → session key
    player_index: HashMap<ParticipantId, String>,
    host: Host,
}

impl SessionManager {
    pub fn new(host: Host) -> Self {
        Self {
            arenas: HashMap::new(),
            sessions: HashMap::new(),
            player_index: HashMap::new(),
            host,
        }
    }

    /// Register an arena. An existing session for it keeps running with the
    /// arena it was created from.
    pub fn add_arena(&mut self, arena: Arena) {
        let key = arena.key();
        let problems = arena.validate();
        if problems.is_empty() {
            tracing::info!(arena = %arena.name, props = arena.props.len(), "Arena registered");
        } else {
            tracing::warn!(arena = %arena.name, missing = ?problems, "Arena registered with incomplete setup");
        }
        self.arenas.insert(key, arena);
    }

    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    pub fn session(&self, arena: &str) -> Option<&Session> {
        self.sessions.get(&arena.to_lowercase())
    }

    /// The session for `arena`, created from the registered arena if needed.
    pub fn get_or_create(&mut self, arena: &str) -> Result<&mut Session, RejectedAction> {
        let key = self.ensure_session(arena)?;
        self.sessions
            .get_mut(&key)
            .ok_or(RejectedAction::UnknownArena(key))
    }

    fn ensure_session(&mut self, arena: &str) -> Result<String, RejectedAction> {
        let key = arena.to_lowercase();
        if !self.sessions.contains_key(&key) {
            let registered = self
                .arenas
                .get(&key)
                .ok_or_else(|| RejectedAction::UnknownArena(arena.to_string()))?;
            let session = Session::new(registered.clone(), registered.settings.clone());
            tracing::debug!(arena = %registered.name, "Session created");
            self.sessions.insert(key.clone(), session);
        }
        Ok(key)
    }

    /// Put a player into a session. With no arena named, picks the joinable
    /// session with the most players. Returns the arena key joined.
    pub fn join(
        &mut self,
        id: ParticipantId,
        name: &str,
        arena: Option<&str>,
    ) -> Result<String, RejectedAction> {
        if self.player_index.contains_key(&id) {
            return Err(RejectedAction::AlreadyInGame);
        }
        let key = match arena {
            Some(wanted) => {
                let key = wanted.to_lowercase();
                let arena = self
                    .arenas
                    .get(&key)
                    .ok_or_else(|| RejectedAction::UnknownArena(wanted.to_string()))?;
                if !arena.enabled {
                    return Err(RejectedAction::ArenaDisabled);
                }
                arena.check_ready()?;
                key
            }
            None => self
                .best_joinable()
                .ok_or(RejectedAction::NoJoinableSession)?,
        };

        let key = self.ensure_session(&key)?;
        let session = self
            .sessions
            .get_mut(&key)
            .ok_or_else(|| RejectedAction::UnknownArena(key.clone()))?;
        session.add_player(&mut self.host, id, name)?;
        self.player_index.insert(id, key.clone());
        Ok(key)
    }

    /// Fullest session that still accepts players. Arenas without a session
    /// count as empty; ties go to the alphabetically first arena.
    fn best_joinable(&self) -> Option<String> {
        let mut best: Option<(usize, &String)> = None;
        for (key, arena) in &self.arenas {
            if !arena.enabled || !arena.is_valid() {
                continue;
            }
            let players = match self.sessions.get(key) {
                Some(session) if !session.can_join() => continue,
                Some(session) => session.player_count(),
                None => 0,
            };
            let better = match best {
                None => true,
                Some((count, best_key)) => {
                    players > count || (players == count && key < best_key)
                }
            };
            if better {
                best = Some((players, key));
            }
        }
        best.map(|(_, key)| key.clone())
    }

    /// Take a player out of whatever session they are in.
    pub fn leave(&mut self, id: ParticipantId) -> Result<String, RejectedAction> {
        let key = self
            .player_index
            .remove(&id)
            .ok_or(RejectedAction::NotInGame)?;
        if let Some(session) = self.sessions.get_mut(&key) {
            session.remove_player(&mut self.host, id)?;
        }
        self.prune_index();
        Ok(key)
    }

    // ================================================================
    // Admin
    // ================================================================

    pub fn force_start(&mut self, arena: &str) -> Result<(), RejectedAction> {
        let key = self.ensure_session(arena)?;
        self.with_session(&key, |session, host| session.force_start(host))
    }

    pub fn force_stop(&mut self, arena: &str) -> Result<(), RejectedAction> {
        let key = self.ensure_session(arena)?;
        self.with_session(&key, |session, host| {
            session.force_stop(host);
            Ok(())
        })?;
        self.prune_index();
        Ok(())
    }

    /// Stop every session. Used on shutdown.
    pub fn end_all(&mut self) {
        for session in self.sessions.values_mut() {
            session.force_stop(&mut self.host);
        }
        self.player_index.clear();
        tracing::info!(sessions = self.sessions.len(), "All sessions ended");
    }

    /// Stop a session and forget it. Returns whether one existed.
    pub fn remove_session(&mut self, arena: &str) -> bool {
        let Some(mut session) = self.sessions.remove(&arena.to_lowercase()) else {
            return false;
        };
        session.force_stop(&mut self.host);
        self.prune_index();
        true
    }

    pub fn set_arena_enabled(&mut self, arena: &str, enabled: bool) -> Result<(), RejectedAction> {
        let key = arena.to_lowercase();
        let registered = self
            .arenas
            .get_mut(&key)
            .ok_or_else(|| RejectedAction::UnknownArena(arena.to_string()))?;
        registered.enabled = enabled;
        if let Some(session) = self.sessions.get_mut(&key) {
            session.set_enabled(&mut self.host, enabled);
        }
        self.prune_index();
        tracing::info!(arena = %key, enabled, "Arena availability changed");
        Ok(())
    }

    /// Shift the armed countdown: positive adds seconds, negative removes.
    pub fn adjust_time(&mut self, arena: &str, seconds: i64) -> Result<u32, RejectedAction> {
        let key = self.ensure_session(arena)?;
        self.with_session(&key, |session, _| {
            let amount = u32::try_from(seconds.unsigned_abs()).unwrap_or(u32::MAX);
            if seconds >= 0 {
                session.add_time(amount);
            } else {
                session.remove_time(amount);
            }
            Ok(session.remaining())
        })
    }

    // ================================================================
    // Clock
    // ================================================================

    /// Advance every session by one second.
    pub fn tick_all(&mut self) {
        for session in self.sessions.values_mut() {
            session.tick(&mut self.host);
        }
        self.prune_index();
    }

    /// Keep stand-ins on their owners. Runs every frame.
    pub fn sync_all(&mut self) {
        for session in self.sessions.values_mut() {
            session.sync_disguises(&mut self.host);
        }
    }

    /// Drop index entries for players a session has released on its own
    /// (round reset, disable).
    fn prune_index(&mut self) {
        let sessions = &self.sessions;
        self.player_index
            .retain(|id, key| sessions.get(key).is_some_and(|s| s.contains(*id)));
    }

    // ================================================================
    // Player commands
    // ================================================================

    pub fn select_team(&mut self, id: ParticipantId, team: Team) -> Result<(), RejectedAction> {
        self.with_player(id, |session, _| session.select_team(id, team))
    }

    pub fn change_disguise(
        &mut self,
        id: ParticipantId,
        material: &str,
    ) -> Result<PropKind, RejectedAction> {
        self.with_player(id, |session, host| session.change_disguise(host, id, material))
    }

    pub fn toggle_lock(&mut self, id: ParticipantId) -> Result<bool, RejectedAction> {
        self.with_player(id, |session, host| session.toggle_lock(host, id))
    }

    pub fn rotate_disguise(&mut self, id: ParticipantId, degrees: f32) -> Result<f32, RejectedAction> {
        self.with_player(id, |session, host| session.rotate_disguise(host, id, degrees))
    }

    pub fn taunt(&mut self, id: ParticipantId) -> Result<(), RejectedAction> {
        self.with_player(id, |session, host| session.voluntary_taunt(host, id))
    }

    pub fn attack(
        &mut self,
        id: ParticipantId,
        target: AttackTarget,
    ) -> Result<AttackOutcome, RejectedAction> {
        self.with_player(id, |session, host| session.attack(host, id, target))
    }

    /// Player movement reported by the client. Disguises catch up on the
    /// next sync.
    pub fn move_player(&mut self, id: ParticipantId, to: Location) -> Result<(), RejectedAction> {
        self.with_player(id, |_, host| {
            host.world.teleport(id, to);
            Ok(())
        })
    }

    fn with_player<R>(
        &mut self,
        id: ParticipantId,
        f: impl FnOnce(&mut Session, &mut Host) -> Result<R, RejectedAction>,
    ) -> Result<R, RejectedAction> {
        let key = self
            .player_index
            .get(&id)
            .cloned()
            .ok_or(RejectedAction::NotInGame)?;
        self.with_session(&key, f)
    }

    fn with_session<R>(
        &mut self,
        key: &str,
        f: impl FnOnce(&mut Session, &mut Host) -> Result<R, RejectedAction>,
    ) -> Result<R, RejectedAction> {
        let session = self
            .sessions
            .get_mut(key)
            .ok_or_else(|| RejectedAction::UnknownArena(key.to_string()))?;
        f(session, &mut self.host)
    }

    // ================================================================
    // Status
    // ================================================================

    /// Snapshot of an arena's session. An arena with no session yet reports
    /// what a fresh one would look like; none is created.
    pub fn snapshot(&self, arena: &str) -> Result<SessionSnapshot, RejectedAction> {
        let key = arena.to_lowercase();
        if let Some(session) = self.sessions.get(&key) {
            return Ok(session.snapshot());
        }
        let registered = self
            .arenas
            .get(&key)
            .ok_or_else(|| RejectedAction::UnknownArena(arena.to_string()))?;
        Ok(Session::new(registered.clone(), registered.settings.clone()).snapshot())
    }

    pub fn arena_of(&self, id: ParticipantId) -> Option<&str> {
        self.player_index.get(&id).map(String::as_str)
    }

    /// Sessions that currently have players.
    pub fn active_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.player_count() > 0)
            .count()
    }

    pub fn total_players(&self) -> usize {
        self.sessions.values().map(Session::player_count).sum()
    }

    pub fn status(&self) -> ServerStatus {
        let mut sessions: Vec<SessionSnapshot> =
            self.sessions.values().map(Session::snapshot).collect();
        sessions.sort_by(|a, b| a.arena.cmp(&b.arena));
        ServerStatus {
            arenas: self.arenas.len(),
            active_sessions: self.active_count(),
            total_players: self.total_players(),
            sessions,
        }
    }
}
