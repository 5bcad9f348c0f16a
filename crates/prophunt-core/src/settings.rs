use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::team::TeamSelectionMode;

/// Milliseconds in one server tick; attack cooldowns are configured in ticks.
pub const TICK_MS: u64 = 50;

/// Seconds-remaining thresholds for the three late-game phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationThresholds {
    pub phase_one: u32,
    pub phase_two: u32,
    pub phase_three: u32,
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            phase_one: 120,
            phase_two: 60,
            phase_three: 30,
        }
    }
}

/// Per-arena round settings. Each session takes its own copy at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub min_players: usize,
    pub max_players: usize,

    /// Lobby countdown (seconds).
    pub lobby_countdown: u32,
    /// Hiding phase length (seconds).
    pub hide_time: u32,
    /// Hunting phase length (seconds).
    pub seek_time: u32,
    /// Delay between the end announcement and the reset (seconds).
    pub end_delay: u32,

    /// Share of players that become props under random assignment.
    pub prop_percentage: f64,
    pub team_selection: TeamSelectionMode,
    pub min_props: usize,
    pub min_hunters: usize,

    pub prop_health: f64,
    pub prop_changes: u32,
    /// Minimum time between two disguise changes (seconds).
    pub prop_change_cooldown: u32,
    pub can_lock: bool,
    /// Time a revealed prop must stay unhit to slip away (seconds).
    pub escape_time: u32,

    pub hunter_health: f64,
    pub hit_damage: f64,
    /// Damage taken on a wrong hit; also the heal granted on a right one.
    pub miss_penalty: f64,
    /// Attack cooldown in ticks of 50 ms.
    pub attack_cooldown: u32,

    /// Seconds between forced taunts; 0 disables them.
    pub forced_taunt_interval: u32,
    pub voluntary_taunt_cooldown: u32,
    pub voluntary_taunt_points: u32,

    pub found_points: u32,
    pub kill_points: u32,
    pub escape_points: u32,
    pub first_blood_bonus: u32,
    pub prop_survival_points_per_minute: u32,
    pub prop_win_bonus: u32,
    pub hunter_win_bonus: u32,

    pub escalation: EscalationThresholds,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_players: 6,
            max_players: 20,
            lobby_countdown: 30,
            hide_time: 30,
            seek_time: 300,
            end_delay: 10,
            prop_percentage: 0.6,
            team_selection: TeamSelectionMode::Random,
            min_props: 1,
            min_hunters: 1,
            prop_health: 20.0,
            prop_changes: 3,
            prop_change_cooldown: 30,
            can_lock: true,
            escape_time: 10,
            hunter_health: 20.0,
            hit_damage: 4.0,
            miss_penalty: 2.0,
            attack_cooldown: 20,
            forced_taunt_interval: 45,
            voluntary_taunt_cooldown: 30,
            voluntary_taunt_points: 50,
            found_points: 25,
            kill_points: 50,
            escape_points: 20,
            first_blood_bonus: 25,
            prop_survival_points_per_minute: 10,
            prop_win_bonus: 100,
            hunter_win_bonus: 100,
            escalation: EscalationThresholds::default(),
        }
    }
}

impl GameSettings {
    /// Return a copy with every field forced into its legal range.
    ///
    /// Applying `clamped` twice yields the same value as applying it once.
    pub fn clamped(&self) -> Self {
        let mut s = self.clone();
        s.min_players = s.min_players.max(2);
        s.max_players = s.max_players.max(s.min_players);
        s.lobby_countdown = s.lobby_countdown.max(5);
        s.hide_time = s.hide_time.max(10);
        s.seek_time = s.seek_time.max(60);
        s.prop_percentage = clamp_percentage(s.prop_percentage);
        s.hit_damage = non_negative(s.hit_damage);
        s.miss_penalty = non_negative(s.miss_penalty);
        if s.forced_taunt_interval != 0 {
            s.forced_taunt_interval = s.forced_taunt_interval.max(10);
        }
        s.voluntary_taunt_cooldown = s.voluntary_taunt_cooldown.max(5);
        if !(s.prop_health.is_finite() && s.prop_health > 0.0) {
            s.prop_health = 20.0;
        }
        if !(s.hunter_health.is_finite() && s.hunter_health > 0.0) {
            s.hunter_health = 20.0;
        }
        let e = &mut s.escalation;
        e.phase_two = e.phase_two.min(e.phase_one);
        e.phase_three = e.phase_three.min(e.phase_two);
        s
    }

    /// Props for a lobby of `player_count` under random assignment.
    pub fn calculate_prop_count(&self, player_count: usize) -> usize {
        let count = (player_count as f64 * self.prop_percentage).round() as usize;
        count.min(player_count)
    }

    pub fn calculate_hunter_count(&self, player_count: usize) -> usize {
        player_count - self.calculate_prop_count(player_count)
    }

    pub fn attack_cooldown_ms(&self) -> u64 {
        u64::from(self.attack_cooldown) * TICK_MS
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(s)?;
        Ok(settings.clamped())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read settings from a TOML file and clamp them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

fn clamp_percentage(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.3, 0.8) } else { 0.6 }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = GameSettings::default();
        assert_eq!(s.min_players, 6);
        assert_eq!(s.max_players, 20);
        assert_eq!(s.lobby_countdown, 30);
        assert_eq!(s.hide_time, 30);
        assert_eq!(s.seek_time, 300);
        assert!((s.prop_percentage - 0.6).abs() < f64::EPSILON);
        assert_eq!(s.attack_cooldown, 20);
        assert_eq!(s.attack_cooldown_ms(), 1000);
        assert_eq!(s.forced_taunt_interval, 45);
        assert_eq!(s.voluntary_taunt_cooldown, 30);
        assert_eq!(s.escalation, EscalationThresholds::default());
    }

    #[test]
    fn clamp_enforces_minimums() {
        let s = GameSettings {
            min_players: 0,
            max_players: 1,
            lobby_countdown: 1,
            hide_time: 2,
            seek_time: 10,
            prop_percentage: 0.95,
            forced_taunt_interval: 3,
            voluntary_taunt_cooldown: 1,
            ..GameSettings::default()
        }
        .clamped();
        assert_eq!(s.min_players, 2);
        assert_eq!(s.max_players, 2);
        assert_eq!(s.lobby_countdown, 5);
        assert_eq!(s.hide_time, 10);
        assert_eq!(s.seek_time, 60);
        assert!((s.prop_percentage - 0.8).abs() < f64::EPSILON);
        assert_eq!(s.forced_taunt_interval, 10);
        assert_eq!(s.voluntary_taunt_cooldown, 5);
    }

    #[test]
    fn zero_forced_taunt_interval_stays_disabled() {
        let s = GameSettings {
            forced_taunt_interval: 0,
            ..GameSettings::default()
        }
        .clamped();
        assert_eq!(s.forced_taunt_interval, 0);
    }

    #[test]
    fn nan_percentage_falls_back_to_default() {
        let s = GameSettings {
            prop_percentage: f64::NAN,
            ..GameSettings::default()
        }
        .clamped();
        assert!((s.prop_percentage - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn escalation_thresholds_forced_descending() {
        let s = GameSettings {
            escalation: EscalationThresholds {
                phase_one: 50,
                phase_two: 90,
                phase_three: 120,
            },
            ..GameSettings::default()
        }
        .clamped();
        assert_eq!(s.escalation.phase_two, 50);
        assert_eq!(s.escalation.phase_three, 50);
    }

    #[test]
    fn prop_count_rounds_half_up() {
        let s = GameSettings::default();
        assert_eq!(s.calculate_prop_count(10), 6);
        assert_eq!(s.calculate_prop_count(5), 3);
        assert_eq!(s.calculate_prop_count(2), 1);
        assert_eq!(s.calculate_hunter_count(10), 4);
        assert_eq!(s.calculate_prop_count(0), 0);
    }

    // ================================================================
    // TOML persistence
    // ================================================================

    #[test]
    fn toml_round_trip_preserves_numeric_fields() {
        let original = GameSettings {
            min_players: 3,
            max_players: 12,
            lobby_countdown: 15,
            hide_time: 45,
            seek_time: 240,
            prop_percentage: 0.45,
            miss_penalty: 3.5,
            attack_cooldown: 10,
            voluntary_taunt_points: 15,
            hunter_win_bonus: 75,
            ..GameSettings::default()
        };
        let text = original.to_toml_string().unwrap();
        let loaded = GameSettings::from_toml_str(&text).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let loaded = GameSettings::from_toml_str(
            r#"
min_players = 4
team_selection = "choice"

[escalation]
phase_one = 90
"#,
        )
        .unwrap();
        assert_eq!(loaded.min_players, 4);
        assert_eq!(loaded.max_players, 20);
        assert_eq!(loaded.team_selection, TeamSelectionMode::Choice);
        assert_eq!(loaded.escalation.phase_one, 90);
        assert_eq!(loaded.escalation.phase_two, 60);
    }

    #[test]
    fn out_of_range_toml_is_clamped_on_load() {
        let loaded = GameSettings::from_toml_str("prop_percentage = 0.1\n").unwrap();
        assert!((loaded.prop_percentage - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("prophunt-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("arena.toml");
        let original = GameSettings {
            seek_time: 600,
            ..GameSettings::default()
        };
        original.save(&path).unwrap();
        let loaded = GameSettings::load(&path).unwrap();
        assert_eq!(loaded, original);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = GameSettings::load("/nonexistent/prophunt.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prophunt.toml"));
    }

    proptest! {
        #[test]
        fn clamp_is_idempotent(
            min_players in 0usize..50,
            max_players in 0usize..50,
            pct in -1.0f64..2.0,
            hide in 0u32..100,
            seek in 0u32..1000,
            taunt in 0u32..100,
        ) {
            let s = GameSettings {
                min_players,
                max_players,
                prop_percentage: pct,
                hide_time: hide,
                seek_time: seek,
                forced_taunt_interval: taunt,
                ..GameSettings::default()
            };
            let once = s.clamped();
            let twice = once.clamped();
            prop_assert_eq!(&once, &twice);
            prop_assert!((0.3..=0.8).contains(&once.prop_percentage));
            prop_assert!(once.max_players >= once.min_players);
        }
    }
}
