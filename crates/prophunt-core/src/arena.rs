use std::path::Path;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::disguise::PropKind;
use crate::error::{ConfigError, RejectedAction};
use crate::geometry::{Location, Position, Region};
use crate::settings::GameSettings;

/// Props needed before an arena may host a round.
pub const MIN_CATALOG_SIZE: usize = 5;

/// A playable map: regions, spawns, the prop catalog and round settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub name: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lobby_spawn: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunter_cage: Option<Region>,
    pub prop_spawns: Vec<Location>,
    pub hunter_spawns: Vec<Location>,
    pub props: Vec<PropKind>,
    pub settings: GameSettings,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            region: None,
            lobby_spawn: None,
            hunter_cage: None,
            prop_spawns: Vec::new(),
            hunter_spawns: Vec::new(),
            props: Vec::new(),
            settings: GameSettings::default(),
        }
    }
}

impl Arena {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Registry key: arena names are case-insensitive.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Missing setup requirements; empty when the arena is playable.
    pub fn validate(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.region.is_none() {
            missing.push("Arena region not defined".to_string());
        }
        if self.lobby_spawn.is_none() {
            missing.push("Lobby spawn not set".to_string());
        }
        if self.hunter_cage.is_none() {
            missing.push("Hunter cage region not defined".to_string());
        }
        if self.prop_spawns.is_empty() {
            missing.push("No prop spawn points".to_string());
        }
        if self.hunter_spawns.is_empty() {
            missing.push("No hunter spawn points".to_string());
        }
        if self.props.len() < MIN_CATALOG_SIZE {
            missing.push("Less than 5 valid props".to_string());
        }
        missing
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn check_ready(&self) -> Result<(), RejectedAction> {
        let missing = self.validate();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RejectedAction::SetupIncomplete(missing))
        }
    }

    pub fn set_region(&mut self, region: Region) -> Result<(), ConfigError> {
        region.check_scan_limit()?;
        self.region = Some(region);
        Ok(())
    }

    pub fn set_hunter_cage(&mut self, cage: Region) {
        self.hunter_cage = Some(cage);
    }

    pub fn is_in_arena(&self, pos: &Position) -> bool {
        self.region.is_some_and(|r| r.contains(pos))
    }

    /// Register a prop type; duplicates are ignored.
    pub fn add_prop(&mut self, kind: PropKind) {
        if !self.props.iter().any(|p| p.material == kind.material) {
            self.props.push(kind);
        }
    }

    pub fn catalog_prop(&self, material: &str) -> Option<&PropKind> {
        self.props
            .iter()
            .find(|p| p.material.eq_ignore_ascii_case(material))
    }

    pub fn is_prop_allowed(&self, material: &str) -> bool {
        self.catalog_prop(material).is_some()
    }

    pub fn random_prop<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PropKind> {
        self.props.choose(rng).cloned()
    }

    pub fn random_prop_spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Location> {
        self.prop_spawns.choose(rng).copied()
    }

    /// A hunter spawn, falling back to the cage centre.
    pub fn random_hunter_spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Location> {
        self.hunter_spawns
            .choose(rng)
            .copied()
            .or_else(|| self.cage_spawn())
    }

    /// Cage centre, falling back to a hunter spawn.
    pub fn cage_spawn(&self) -> Option<Location> {
        self.hunter_cage
            .map(|c| c.center())
            .or_else(|| self.hunter_spawns.first().copied())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let mut arena: Self = toml::from_str(s)?;
        if let Some(region) = arena.region {
            region.check_scan_limit()?;
        }
        arena.settings = arena.settings.clamped();
        Ok(arena)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load an arena file. A missing `name` defaults to the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut arena = Self::from_toml_str(&contents)?;
        if arena.name.is_empty()
            && let Some(stem) = path.file_stem()
        {
            arena.name = stem.to_string_lossy().into_owned();
        }
        Ok(arena)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load every `*.toml` file in `dir`. Unreadable files are logged and
    /// skipped.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Self>, ConfigError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut arenas = Vec::new();
        for path in paths {
            match Self::load(&path) {
                Ok(arena) => {
                    tracing::info!(
                        arena = %arena.name,
                        valid = arena.is_valid(),
                        "Loaded arena"
                    );
                    arenas.push(arena);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping arena file");
                }
            }
        }
        Ok(arenas)
    }
}
