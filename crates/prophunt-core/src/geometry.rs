use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest region volume (in blocks) the arena scanner will accept.
pub const MAX_SCAN_VOLUME: u64 = 1_000_000;

/// A point in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The block containing this point.
    pub fn block(&self) -> BlockPos {
        BlockPos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Offset upward by `dy`, used for cue placement above a prop.
    pub fn raised(&self, dy: f64) -> Position {
        Position {
            y: self.y + dy,
            ..*self
        }
    }
}

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A position plus a facing angle (degrees around the vertical axis).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub pos: Position,
    #[serde(default)]
    pub yaw: f32,
}

impl Location {
    pub const fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            pos: Position::new(x, y, z),
            yaw: 0.0,
        }
    }

    /// Same place, different facing.
    pub fn with_yaw(self, yaw: f32) -> Self {
        Self { yaw, ..self }
    }
}

/// Axis-aligned block region defined by two inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Region {
    /// Build a region from two arbitrary corners.
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Number of blocks enclosed, corners inclusive.
    pub fn volume(&self) -> u64 {
        let dx = (i64::from(self.max.x) - i64::from(self.min.x)).unsigned_abs() + 1;
        let dy = (i64::from(self.max.y) - i64::from(self.min.y)).unsigned_abs() + 1;
        let dz = (i64::from(self.max.z) - i64::from(self.min.z)).unsigned_abs() + 1;
        dx.saturating_mul(dy).saturating_mul(dz)
    }

    pub fn center(&self) -> Location {
        Location::at(
            (f64::from(self.min.x) + f64::from(self.max.x) + 1.0) / 2.0,
            f64::from(self.min.y),
            (f64::from(self.min.z) + f64::from(self.max.z) + 1.0) / 2.0,
        )
    }

    pub fn contains(&self, pos: &Position) -> bool {
        let b = pos.block();
        (self.min.x..=self.max.x).contains(&b.x)
            && (self.min.y..=self.max.y).contains(&b.y)
            && (self.min.z..=self.max.z).contains(&b.z)
    }

    /// Whether the region is small enough to be scanned for props.
    pub fn within_scan_limit(&self) -> bool {
        self.volume() <= MAX_SCAN_VOLUME
    }

    pub fn check_scan_limit(&self) -> Result<(), ConfigError> {
        if self.within_scan_limit() {
            Ok(())
        } else {
            Err(ConfigError::RegionTooLarge {
                volume: self.volume(),
                limit: MAX_SCAN_VOLUME,
            })
        }
    }
}
