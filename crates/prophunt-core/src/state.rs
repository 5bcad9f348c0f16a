use serde::{Deserialize, Serialize};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// Arena switched off by an admin.
    Disabled,
    /// Lobby open, waiting for enough players.
    #[default]
    Waiting,
    /// Lobby countdown running.
    Starting,
    /// Props hide, hunters are caged.
    Hiding,
    /// Hunters are released.
    Hunting,
    /// Round over, winner announced, reset pending.
    Ending,
}

impl GameState {
    /// New players may only enter while the lobby is open.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }

    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::Hiding | Self::Hunting)
    }

    /// Whether `self -> to` is a legal edge of the session state machine.
    ///
    /// Forward edges run Waiting → Starting → Hiding → Hunting → Ending →
    /// Waiting. A cancelled countdown returns Starting → Waiting, a force
    /// start may skip the countdown (Waiting → Hiding), a side emptying during
    /// the hide phase ends the round early (Hiding → Ending), and any state
    /// may be reset to Waiting or switched to Disabled.
    pub fn can_transition(self, to: GameState) -> bool {
        use GameState::*;
        matches!(
            (self, to),
            (Waiting, Starting)
                | (Starting, Hiding)
                | (Waiting, Hiding)
                | (Hiding, Hunting)
                | (Hunting, Ending)
                | (Hiding, Ending)
                | (_, Waiting)
                | (_, Disabled)
        ) && self != to
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disabled => "DISABLED",
            Self::Waiting => "WAITING",
            Self::Starting => "STARTING",
            Self::Hiding => "HIDING",
            Self::Hunting => "HUNTING",
            Self::Ending => "ENDING",
        };
        f.write_str(s)
    }
}
