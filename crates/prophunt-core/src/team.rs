use serde::{Deserialize, Serialize};

/// Team tag carried by every participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    #[default]
    None,
    Props,
    Hunters,
    Spectator,
}

impl Team {
    /// Only props and hunters can be chosen before a round.
    pub fn is_playable(self) -> bool {
        matches!(self, Self::Props | Self::Hunters)
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Props => "props",
            Self::Hunters => "hunters",
            Self::Spectator => "spectator",
        };
        f.write_str(s)
    }
}

/// How the roster splits the lobby into teams when a round starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSelectionMode {
    /// Players pick a side; undecided players fill the gaps.
    Choice,
    /// Shuffle and split by the configured prop percentage.
    #[default]
    Random,
    /// Players pick, then choosers are moved until both minimums hold.
    Hybrid,
}

impl TeamSelectionMode {
    /// Case-insensitive parse; unknown names fall back to `Random`.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "choice" => Self::Choice,
            "hybrid" => Self::Hybrid,
            _ => Self::Random,
        }
    }
}
