use serde::{Deserialize, Serialize};

use crate::team::Team;

/// Per-round contribution of one participant, pushed to the stats sink at
/// the end of every round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsDelta {
    pub name: String,
    pub side: Team,
    pub won: bool,
    /// Still alive when the round ended.
    pub survived: bool,
    pub props_found: u32,
    pub props_killed: u32,
    pub wrong_hits: u32,
    pub taunts: u32,
    pub points: u32,
    /// Seconds between joining and the end of the round.
    pub survival_secs: u64,
}

/// Lifetime totals for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub last_known_name: String,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub times_as_prop: u32,
    pub prop_survives: u32,
    pub prop_deaths: u32,
    pub time_as_hidden_prop: u64,
    pub successful_taunts: u32,
    pub times_as_hunter: u32,
    pub props_found: u32,
    pub props_killed: u32,
    pub wrong_hits: u32,
    pub hunter_deaths: u32,
    pub total_points: u64,
    pub highest_game_points: u32,
    pub total_play_time: u64,
}

impl LifetimeStats {
    pub fn apply(&mut self, delta: &StatsDelta) {
        self.last_known_name.clone_from(&delta.name);
        self.games_played += 1;
        if delta.won {
            self.games_won += 1;
        } else {
            self.games_lost += 1;
        }

        match delta.side {
            Team::Props => {
                self.times_as_prop += 1;
                self.successful_taunts += delta.taunts;
                if delta.survived {
                    self.prop_survives += 1;
                    self.time_as_hidden_prop += delta.survival_secs;
                } else {
                    self.prop_deaths += 1;
                }
            }
            Team::Hunters => {
                self.times_as_hunter += 1;
                self.props_found += delta.props_found;
                self.props_killed += delta.props_killed;
                self.wrong_hits += delta.wrong_hits;
                if !delta.survived {
                    self.hunter_deaths += 1;
                }
            }
            Team::None | Team::Spectator => {}
        }

        self.total_points += u64::from(delta.points);
        self.highest_game_points = self.highest_game_points.max(delta.points);
        self.total_play_time += delta.survival_secs;
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        f64::from(self.games_won) * 100.0 / f64::from(self.games_played)
    }

    pub fn kd_ratio(&self) -> f64 {
        if self.hunter_deaths == 0 {
            return f64::from(self.props_killed);
        }
        f64::from(self.props_killed) / f64::from(self.hunter_deaths)
    }
}
