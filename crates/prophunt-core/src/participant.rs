use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::SavedState;
use crate::disguise::Disguise;
use crate::settings::TICK_MS;
use crate::team::Team;

/// Stable player identity.
pub type ParticipantId = Uuid;

/// Disguise and survival state of a prop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropState {
    pub disguise: Option<Disguise>,
    pub revealed: bool,
    pub revealed_at: Option<u64>,
    pub changes_remaining: u32,
    pub last_change_at: Option<u64>,
    pub last_taunt_at: Option<u64>,
    pub times_found: u32,
    pub times_escaped: u32,
    pub voluntary_taunts: u32,
}

impl PropState {
    pub fn new(changes: u32) -> Self {
        Self {
            changes_remaining: changes,
            ..Self::default()
        }
    }

    pub fn is_disguised(&self) -> bool {
        self.disguise.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.disguise.as_ref().is_some_and(Disguise::is_locked)
    }

    /// Seconds until another disguise change is allowed; `None` when allowed
    /// now. The budget is checked separately.
    pub fn change_cooldown_left(&self, now: u64, cooldown_secs: u32) -> Option<u64> {
        remaining_secs(self.last_change_at, now, cooldown_secs)
    }

    pub fn taunt_cooldown_left(&self, now: u64, cooldown_secs: u32) -> Option<u64> {
        remaining_secs(self.last_taunt_at, now, cooldown_secs)
    }

    /// Mark as revealed. Returns `true` when the prop was hidden before.
    ///
    /// Every hit refreshes the reveal time, so the escape window restarts.
    pub fn reveal(&mut self, now: u64) -> bool {
        let first = !self.revealed;
        self.revealed = true;
        self.revealed_at = Some(now);
        if first {
            self.times_found += 1;
        }
        first
    }

    pub fn hide(&mut self) {
        self.revealed = false;
        self.revealed_at = None;
        self.times_escaped += 1;
    }

    /// Revealed and unhit for at least `escape_secs`.
    pub fn can_hide_again(&self, now: u64, escape_secs: u32) -> bool {
        match (self.revealed, self.revealed_at) {
            (true, Some(at)) => now.saturating_sub(at) >= u64::from(escape_secs) * 1000,
            _ => false,
        }
    }

    pub fn record_change(&mut self, now: u64) {
        self.changes_remaining = self.changes_remaining.saturating_sub(1);
        self.last_change_at = Some(now);
    }

    pub fn record_taunt(&mut self, now: u64) {
        self.last_taunt_at = Some(now);
        self.voluntary_taunts += 1;
    }
}

fn remaining_secs(last: Option<u64>, now: u64, cooldown_secs: u32) -> Option<u64> {
    let last = last?;
    let cooldown_ms = u64::from(cooldown_secs) * 1000;
    let elapsed = now.saturating_sub(last);
    (elapsed < cooldown_ms).then(|| (cooldown_ms - elapsed).div_ceil(1000))
}

/// Combat record of a hunter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HunterState {
    pub last_attack_at: Option<u64>,
    pub attack_cooldown_ticks: u32,
    pub props_found: u32,
    pub props_killed: u32,
    pub wrong_hits: u32,
    pub first_blood: bool,
}

impl HunterState {
    pub fn new(attack_cooldown_ticks: u32) -> Self {
        Self {
            attack_cooldown_ticks,
            ..Self::default()
        }
    }

    pub fn can_attack(&self, now: u64) -> bool {
        match self.last_attack_at {
            None => true,
            Some(at) => {
                now.saturating_sub(at) >= u64::from(self.attack_cooldown_ticks) * TICK_MS
            }
        }
    }

    pub fn record_attack(&mut self, now: u64) {
        self.last_attack_at = Some(now);
    }

    /// Percentage of swings that found a prop.
    pub fn accuracy(&self) -> f64 {
        let total = self.props_found + self.wrong_hits;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.props_found) * 100.0 / f64::from(total)
    }
}

/// Role payload, chosen when teams are assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    #[default]
    Waiting,
    Prop(PropState),
    Hunter(HunterState),
}

/// One player inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub team: Team,
    pub points: u32,
    pub joined_at: u64,
    #[serde(skip)]
    pub saved_state: Option<SavedState>,
    pub chosen_team: Option<Team>,
    pub role: Role,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, joined_at: u64) -> Self {
        Self {
            id,
            name: name.into(),
            team: Team::None,
            points: 0,
            joined_at,
            saved_state: None,
            chosen_team: None,
            role: Role::Waiting,
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.points = self.points.saturating_add(points);
    }

    pub fn prop(&self) -> Option<&PropState> {
        match &self.role {
            Role::Prop(p) => Some(p),
            _ => None,
        }
    }

    pub fn prop_mut(&mut self) -> Option<&mut PropState> {
        match &mut self.role {
            Role::Prop(p) => Some(p),
            _ => None,
        }
    }

    pub fn hunter(&self) -> Option<&HunterState> {
        match &self.role {
            Role::Hunter(h) => Some(h),
            _ => None,
        }
    }

    pub fn hunter_mut(&mut self) -> Option<&mut HunterState> {
        match &mut self.role {
            Role::Hunter(h) => Some(h),
            _ => None,
        }
    }

    /// Side this participant played for, even after elimination.
    pub fn side(&self) -> Team {
        match self.role {
            Role::Prop(_) => Team::Props,
            Role::Hunter(_) => Team::Hunters,
            Role::Waiting => self.team,
        }
    }

    /// Whole seconds since the participant joined.
    pub fn seconds_in_game(&self, now: u64) -> u64 {
        now.saturating_sub(self.joined_at) / 1000
    }
}
