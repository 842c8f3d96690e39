//! Placed-structure components: Placement, Structure, Door.

use bulkhead_logic::tiles::{Orientation, TileVec};
use serde::{Deserialize, Serialize};

/// Where a structure sits on the grid and which way it faces.
///
/// Orientation is fixed while a structure stays anchored; re-orienting goes
/// through the engine's move path so derived helpers are re-resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Placement {
    /// The tile this structure occupies (its anchor tile for multi-tile spans).
    pub tile: TileVec,
    /// Cardinal facing; local tile offsets are rotated by this before use.
    pub orientation: Orientation,
    /// Anchored structures participate in the grid index and atmosphere
    /// blocking; unanchored ones are inert cargo.
    pub anchored: bool,
}

impl Placement {
    pub fn new(tile: TileVec) -> Self {
        Self {
            tile,
            orientation: Orientation::North,
            anchored: true,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn unanchored(mut self) -> Self {
        self.anchored = false;
        self
    }
}

/// Display identity for player-visible structures. Seal helpers carry no
/// `Structure` component - they are invisible bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// How many tiles a door spans along its local +x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    Standard,
    Wide,
    Triple,
}

impl DoorKind {
    /// Total tiles occupied, including the anchor tile.
    pub fn span(self) -> i32 {
        match self {
            DoorKind::Standard => 1,
            DoorKind::Wide => 2,
            DoorKind::Triple => 3,
        }
    }

    /// Local-frame offsets of the extra tiles beyond the anchor tile.
    pub fn additional_tiles(self) -> Vec<TileVec> {
        (1..self.span()).map(|x| TileVec::new(x, 0)).collect()
    }
}

/// Door component. Open doors stop blocking air on every tile they span;
/// powered doors fail open when the station loses power.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Door {
    pub kind: DoorKind,
    pub open: bool,
    pub powered: bool,
}

impl Door {
    pub fn new(kind: DoorKind) -> Self {
        Self {
            kind,
            open: false,
            powered: true,
        }
    }

    pub fn unpowered(mut self) -> Self {
        self.powered = false;
        self
    }
}
