use serde::{Deserialize, Serialize};

use crate::team::Team;

/// How an announcement should be surfaced to its recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Chat,
    Title,
}

/// Semantic messages the session asks the presentation layer to show.
///
/// Wording lives in presentation config; each variant maps to a stable
/// message key plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Announcement {
    PlayerJoined { player: String, current: usize, max: usize },
    PlayerLeft { player: String, current: usize, max: usize },
    GameStarting { seconds: u32 },
    CountdownCancelled,
    TeamReveal { team: Team },
    HidePhase { seconds: u32 },
    HuntersReleased,
    TimeWarning { seconds: u32 },
    LateGame { phase: u8 },
    PropGlowing,
    Disguised { material: String },
    Locked,
    Unlocked,
    FirstBlood { hunter: String },
    PropFound,
    HitProp,
    PropEscaped,
    PropEliminated { prop: String, hunter: String },
    HitWrong { damage: f64 },
    HunterEliminated { hunter: String },
    ForcedTaunt,
    TauntHeard,
    TauntSuccess,
    RoundOver { winner: Team },
    Victory { winner: Team },
    Defeat { winner: Team },
    ForceStopped,
}

impl Announcement {
    /// Message key used to look up the configured text.
    pub fn key(&self) -> &'static str {
        match self {
            Self::PlayerJoined { .. } => "game.join",
            Self::PlayerLeft { .. } => "game.leave",
            Self::GameStarting { .. } => "game.game-starting",
            Self::CountdownCancelled => "game.countdown-cancelled",
            Self::TeamReveal { .. } => "team.reveal",
            Self::HidePhase { .. } => "game.hide-phase",
            Self::HuntersReleased => "game.hunters-released",
            Self::TimeWarning { .. } => "game.time-warning",
            Self::LateGame { .. } => "game.late-game",
            Self::PropGlowing => "prop.late-game-glow",
            Self::Disguised { .. } => "prop.disguised",
            Self::Locked => "prop.locked",
            Self::Unlocked => "prop.unlocked",
            Self::FirstBlood { .. } => "hunter.first-blood",
            Self::PropFound => "prop.found",
            Self::HitProp => "hunter.hit-prop",
            Self::PropEscaped => "prop.escaped",
            Self::PropEliminated { .. } => "game.prop-eliminated",
            Self::HitWrong { .. } => "hunter.hit-wrong",
            Self::HunterEliminated { .. } => "game.hunter-eliminated",
            Self::ForcedTaunt => "prop.forced-taunt",
            Self::TauntHeard => "hunter.taunt-heard",
            Self::TauntSuccess => "prop.taunt-success",
            Self::RoundOver { winner: Team::Props } => "game.prop-win",
            Self::RoundOver { .. } => "game.hunter-win",
            Self::Victory { .. } => "game.victory",
            Self::Defeat { .. } => "game.defeat",
            Self::ForceStopped => "game.force-stopped",
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::TeamReveal { .. }
            | Self::HuntersReleased
            | Self::Victory { .. }
            | Self::Defeat { .. } => Channel::Title,
            _ => Channel::Chat,
        }
    }
}

/// Sound/particle cues played at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cue {
    CountdownTick,
    CountdownFinal,
    GameStart,
    HuntersReleased,
    Disguise,
    Lock,
    Unlock,
    GhostStep,
    Hit,
    Kill,
    Miss,
    Taunt,
    /// Phase one: faint sparkle only nearby hunters can see.
    Hint,
    /// Phase two: heartbeat for hunters within the wider radius.
    Heartbeat,
    /// Phase three: continuous ambient effect over every prop.
    Ambient,
    Alarm,
    Victory,
    Defeat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_over_key_depends_on_winner() {
        assert_eq!(
            Announcement::RoundOver { winner: Team::Props }.key(),
            "game.prop-win"
        );
        assert_eq!(
            Announcement::RoundOver {
                winner: Team::Hunters
            }
            .key(),
            "game.hunter-win"
        );
    }

    #[test]
    fn titles_and_chat_channels() {
        assert_eq!(Announcement::HuntersReleased.channel(), Channel::Title);
        assert_eq!(
            Announcement::GameStarting { seconds: 5 }.channel(),
            Channel::Chat
        );
    }

    #[test]
    fn serializes_with_event_tag() {
        let json = serde_json::to_value(Announcement::GameStarting { seconds: 7 }).unwrap();
        assert_eq!(json["event"], "game-starting");
        assert_eq!(json["seconds"], 7);
        let cue = serde_json::to_string(&Cue::CountdownFinal).unwrap();
        assert_eq!(cue, "\"countdown-final\"");
    }
}
