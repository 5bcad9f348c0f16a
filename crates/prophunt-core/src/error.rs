use serde::Serialize;
use thiserror::Error;

/// Why a player or admin command was refused.
///
/// A rejected command never mutates session state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RejectedAction {
    #[error("no arena named {0}")]
    UnknownArena(String),
    #[error("arena is disabled")]
    ArenaDisabled,
    #[error("session is not accepting players")]
    SessionNotJoinable,
    #[error("session is full")]
    SessionFull,
    #[error("no joinable session available")]
    NoJoinableSession,
    #[error("player is already in a game")]
    AlreadyInGame,
    #[error("player is not in this game")]
    NotInGame,
    #[error("at least {0} players are required")]
    NotEnoughPlayers(usize),
    #[error("not allowed in the current phase")]
    WrongPhase,
    #[error("only props can do that")]
    NotAProp,
    #[error("only hunters can do that")]
    NotAHunter,
    #[error("attack is on cooldown")]
    AttackOnCooldown,
    #[error("taunt is on cooldown for {0} more seconds")]
    TauntOnCooldown(u64),
    #[error("disguise change is on cooldown for {0} more seconds")]
    DisguiseOnCooldown(u64),
    #[error("no disguise changes left")]
    NoDisguiseChangesLeft,
    #[error("{0} is not an allowed prop in this arena")]
    PropNotAllowed(String),
    #[error("locking is disabled in this arena")]
    LockingDisabled,
    #[error("player has no active disguise")]
    NoDisguise,
    #[error("nothing to hit at that location")]
    NoTarget,
    #[error("team choice must be props or hunters")]
    InvalidTeamChoice,
    #[error("arena setup incomplete: {}", .0.join(", "))]
    SetupIncomplete(Vec<String>),
}

impl RejectedAction {
    /// Stable machine-readable code for callers that do not want the text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownArena(_) => "unknown_arena",
            Self::ArenaDisabled => "arena_disabled",
            Self::SessionNotJoinable => "session_not_joinable",
            Self::SessionFull => "session_full",
            Self::NoJoinableSession => "no_joinable_session",
            Self::AlreadyInGame => "already_in_game",
            Self::NotInGame => "not_in_game",
            Self::NotEnoughPlayers(_) => "not_enough_players",
            Self::WrongPhase => "wrong_phase",
            Self::NotAProp => "not_a_prop",
            Self::NotAHunter => "not_a_hunter",
            Self::AttackOnCooldown => "attack_on_cooldown",
            Self::TauntOnCooldown(_) => "taunt_on_cooldown",
            Self::DisguiseOnCooldown(_) => "disguise_on_cooldown",
            Self::NoDisguiseChangesLeft => "no_disguise_changes_left",
            Self::PropNotAllowed(_) => "prop_not_allowed",
            Self::LockingDisabled => "locking_disabled",
            Self::NoDisguise => "no_disguise",
            Self::NoTarget => "no_target",
            Self::InvalidTeamChoice => "invalid_team_choice",
            Self::SetupIncomplete(_) => "setup_incomplete",
        }
    }
}

/// Failures loading or saving settings and arena files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("region of {volume} blocks exceeds the scan limit of {limit}")]
    RegionTooLarge { volume: u64, limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_snake_case() {
        assert_eq!(RejectedAction::AttackOnCooldown.code(), "attack_on_cooldown");
        assert_eq!(
            RejectedAction::SetupIncomplete(vec!["x".into()]).code(),
            "setup_incomplete"
        );
    }

    #[test]
    fn setup_incomplete_lists_requirements() {
        let err = RejectedAction::SetupIncomplete(vec![
            "Lobby spawn not set".to_string(),
            "No prop spawn points".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "arena setup incomplete: Lobby spawn not set, No prop spawn points"
        );
    }

    #[test]
    fn serializes_reason_tag() {
        let json = serde_json::to_value(RejectedAction::TauntOnCooldown(12)).unwrap();
        assert_eq!(json["reason"], "taunt_on_cooldown");
        assert_eq!(json["detail"], 12);
    }
}
