use serde::{Deserialize, Serialize};

use crate::adapters::{StandInId, StandInPose, World};
use crate::effects::{EffectKind, StatusEffect};
use crate::geometry::Location;
use crate::participant::ParticipantId;

pub const GHOST_TRANSPARENCY: f32 = 0.5;
pub const SOLID_TRANSPARENCY: f32 = 0.0;

/// Size class of a prop; fixes its health pool and render scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropSize {
    Small,
    Medium,
    Large,
}

const SMALL_KEYWORDS: &[&str] = &[
    "BUTTON",
    "TORCH",
    "CANDLE",
    "FLOWER",
    "SAPLING",
    "LEVER",
    "PRESSURE_PLATE",
    "TRIPWIRE",
    "PICKLE",
];

const SMALL_EXACT: &[&str] = &["DEAD_BUSH", "FERN", "GRASS"];

const LARGE_KEYWORDS: &[&str] = &[
    "BARREL",
    "CHEST",
    "FURNACE",
    "CRAFTING",
    "CAULDRON",
    "COMPOSTER",
    "LECTERN",
    "SMOKER",
    "BLAST",
    "ANVIL",
    "BREWING",
    "ENCHANTING",
    "HOPPER",
    "DISPENSER",
    "DROPPER",
    "OBSERVER",
    "PISTON",
    "BED",
    "SHULKER",
    "BEACON",
    "CONDUIT",
];

impl PropSize {
    pub fn health(self) -> f64 {
        match self {
            Self::Small => 8.0,
            Self::Medium => 14.0,
            Self::Large => 20.0,
        }
    }

    pub fn scale(self) -> f32 {
        match self {
            Self::Small => 0.5,
            Self::Medium => 0.75,
            Self::Large => 1.0,
        }
    }

    /// Classify a block material by name keywords.
    pub fn for_material(material: &str) -> Self {
        let name = material.to_ascii_uppercase();
        let has = |k: &str| name.contains(k);
        let small = SMALL_KEYWORDS.iter().any(|k| has(k))
            || SMALL_EXACT.contains(&name.as_str())
            || (has("CORAL") && !has("BLOCK"))
            || (has("MUSHROOM") && !has("BLOCK") && !has("STEM"));
        if small {
            return Self::Small;
        }
        if LARGE_KEYWORDS.iter().any(|k| has(k)) {
            return Self::Large;
        }
        Self::Medium
    }
}

/// A block type a prop may disguise as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PropKind {
    pub material: String,
    pub size: PropSize,
}

impl PropKind {
    pub fn new(material: impl Into<String>) -> Self {
        let material = material.into().to_ascii_uppercase();
        let size = PropSize::for_material(&material);
        Self { material, size }
    }

    /// "OAK_LOG" -> "Oak Log".
    pub fn display_name(&self) -> String {
        self.material
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let lower = w.to_ascii_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for PropKind {
    fn from(material: String) -> Self {
        Self::new(material)
    }
}

impl From<PropKind> for String {
    fn from(kind: PropKind) -> Self {
        kind.material
    }
}

/// What a per-frame sync did to the owner and its stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Owner not present in the world.
    Skipped,
    /// Locked owner tried to move and was put back.
    Reverted,
    /// Unlocked owner moved; stand-in followed in ghost mode.
    Followed,
    /// Owner stood still; stand-in is solid.
    Still,
}

/// Binding between one prop and its world stand-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disguise {
    kind: PropKind,
    stand_in: StandInId,
    locked: bool,
    rotation: f32,
    transparency: f32,
    glowing: bool,
    anchor: Location,
}

impl Disguise {
    /// Turn `owner` into `kind`: hide the player, spawn the stand-in and set
    /// health from the size class.
    pub fn apply(world: &mut dyn World, owner: ParticipantId, kind: PropKind) -> Self {
        let anchor = world.location(owner).unwrap_or_default();
        world.apply_effect(owner, StatusEffect::permanent(EffectKind::Invisibility));
        let health = kind.size.health();
        world.set_max_health(owner, health);
        world.set_health(owner, health);
        let mut disguise = Self {
            kind,
            stand_in: 0,
            locked: false,
            rotation: anchor.yaw.rem_euclid(360.0),
            transparency: SOLID_TRANSPARENCY,
            glowing: false,
            anchor,
        };
        disguise.stand_in = world.spawn_stand_in(owner, &disguise.kind, disguise.pose());
        disguise
    }

    pub fn kind(&self) -> &PropKind {
        &self.kind
    }

    pub fn stand_in(&self) -> StandInId {
        self.stand_in
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    pub fn is_ghost(&self) -> bool {
        self.transparency > SOLID_TRANSPARENCY
    }

    pub fn is_glowing(&self) -> bool {
        self.glowing
    }

    pub fn anchor(&self) -> Location {
        self.anchor
    }

    pub fn pose(&self) -> StandInPose {
        StandInPose {
            location: self.anchor,
            rotation: self.rotation,
            scale: self.kind.size.scale(),
            transparency: self.transparency,
        }
    }

    /// Locking forces solid rendering; unlocking allows ghosting again.
    pub fn set_locked(&mut self, world: &mut dyn World, locked: bool) {
        self.locked = locked;
        self.transparency = if locked {
            SOLID_TRANSPARENCY
        } else {
            GHOST_TRANSPARENCY
        };
        world.update_stand_in(self.stand_in, self.pose());
    }

    pub fn set_glowing(&mut self, world: &mut dyn World, glowing: bool) {
        if self.glowing != glowing {
            self.glowing = glowing;
            world.set_stand_in_glowing(self.stand_in, glowing);
        }
    }

    pub fn set_rotation(&mut self, world: &mut dyn World, degrees: f32) {
        self.rotation = degrees.rem_euclid(360.0);
        world.update_stand_in(self.stand_in, self.pose());
    }

    pub fn rotate(&mut self, world: &mut dyn World, degrees: f32) {
        self.set_rotation(world, self.rotation + degrees);
    }

    /// Per-frame sync between owner and stand-in.
    ///
    /// Locked: position changes are reverted, facing still rotates the
    /// stand-in. Unlocked: the stand-in follows, ghosting while the owner
    /// moves and turning solid once it stops.
    pub fn sync(&mut self, world: &mut dyn World, owner: ParticipantId) -> SyncOutcome {
        let Some(current) = world.location(owner) else {
            return SyncOutcome::Skipped;
        };
        self.rotation = current.yaw.rem_euclid(360.0);
        let moved = current.pos != self.anchor.pos;

        let outcome = if self.locked {
            if moved {
                world.teleport(owner, self.anchor.with_yaw(current.yaw));
                SyncOutcome::Reverted
            } else {
                SyncOutcome::Still
            }
        } else if moved {
            self.anchor = current;
            self.transparency = GHOST_TRANSPARENCY;
            SyncOutcome::Followed
        } else {
            self.transparency = SOLID_TRANSPARENCY;
            SyncOutcome::Still
        };
        self.anchor.yaw = current.yaw;
        world.update_stand_in(self.stand_in, self.pose());
        outcome
    }

    /// Detach the stand-in and give the owner a normal body back.
    pub fn remove(self, world: &mut dyn World, owner: ParticipantId, restored_health: f64) {
        world.remove_stand_in(self.stand_in);
        world.remove_effect(owner, EffectKind::Invisibility);
        world.set_max_health(owner, restored_health);
        world.set_health(owner, restored_health);
    }
}
