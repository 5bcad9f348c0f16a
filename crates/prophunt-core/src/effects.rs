use serde::{Deserialize, Serialize};

/// Status effects the session applies through the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Blindness,
    Slowness,
    Speed,
    Invisibility,
}

/// An effect request: kind, strength and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    /// Zero-based strength level.
    pub amplifier: u8,
    /// Seconds; `f32::INFINITY` for effects removed explicitly.
    pub duration: f32,
}

impl StatusEffect {
    pub fn new(kind: EffectKind, amplifier: u8, duration: f32) -> Self {
        Self {
            kind,
            amplifier,
            duration,
        }
    }

    pub fn permanent(kind: EffectKind) -> Self {
        Self::new(kind, 0, f32::INFINITY)
    }

    /// Escape boost granted to a prop on every hit (3 s, level II).
    pub fn escape_boost() -> Self {
        Self::new(EffectKind::Speed, 1, 3.0)
    }

    /// Late-game speed buff for hunters (60 s, level I).
    pub fn hunter_rush() -> Self {
        Self::new(EffectKind::Speed, 0, 60.0)
    }

    /// Effects keeping hunters in place while props hide.
    pub fn caged(hide_time: u32) -> [Self; 2] {
        let secs = hide_time as f32;
        [
            Self::new(EffectKind::Blindness, 0, secs),
            Self::new(EffectKind::Slowness, u8::MAX, secs),
        ]
    }
}

/// An effect currently running on a participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect: StatusEffect,
    pub remaining: f32,
}

impl ActiveEffect {
    pub fn new(effect: StatusEffect) -> Self {
        Self {
            remaining: effect.duration,
            effect,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining.is_finite() {
            self.remaining -= dt;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}
