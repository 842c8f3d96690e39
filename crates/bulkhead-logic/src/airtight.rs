//! Airtight marker record and the rules for deriving helper markers.
//!
//! Every object that blocks gas flow on a tile carries an [`AirtightState`].
//! A structure spanning several tiles owns one helper marker per extra tile;
//! [`helper_state`] is the single place that computes what a helper's marker
//! must look like given the owning structure's marker and any configured
//! overrides. Keeping it a pure function means the mirroring rules are
//! testable without an ECS world.

use crate::tiles::Orientation;
use serde::{Deserialize, Serialize};

/// Direction bits for partial blocking. A tile can block gas flow on any
/// subset of its four edges.
pub mod directions {
    pub const NONE: u8 = 0;
    pub const NORTH: u8 = 1 << 0;
    pub const SOUTH: u8 = 1 << 1;
    pub const EAST: u8 = 1 << 2;
    pub const WEST: u8 = 1 << 3;
    pub const ALL: u8 = NORTH | SOUTH | EAST | WEST;
}

/// Rotate a direction bitfield by a structure's facing. Each clockwise
/// quarter turn maps North→East→South→West.
pub fn rotate_directions(dirs: u8, orientation: Orientation) -> u8 {
    let mut d = dirs & directions::ALL;
    for _ in 0..orientation.turns() {
        let mut next = directions::NONE;
        if d & directions::NORTH != 0 {
            next |= directions::EAST;
        }
        if d & directions::EAST != 0 {
            next |= directions::SOUTH;
        }
        if d & directions::SOUTH != 0 {
            next |= directions::WEST;
        }
        if d & directions::WEST != 0 {
            next |= directions::NORTH;
        }
        d = next;
    }
    d
}

/// Per-tile airtight blocking marker.
///
/// `blocked_directions` is expressed in the owning structure's local frame
/// for primaries; helper markers always carry grid-frame directions (see
/// [`helper_state`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirtightState {
    /// Whether the tile currently blocks gas flow at all.
    pub air_blocked: bool,
    /// Which edges are blocked when `air_blocked` is set.
    pub blocked_directions: u8,
    /// Restore a breathable mix when this tile stops being blocked.
    pub fix_vacuum: bool,
    /// Treat the tile as containing no air while every edge is blocked.
    pub no_air_when_fully_blocked: bool,
}

impl Default for AirtightState {
    fn default() -> Self {
        Self {
            air_blocked: true,
            blocked_directions: directions::ALL,
            fix_vacuum: false,
            no_air_when_fully_blocked: true,
        }
    }
}

impl AirtightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.air_blocked = blocked;
        self
    }

    pub fn with_directions(mut self, dirs: u8) -> Self {
        self.blocked_directions = dirs & directions::ALL;
        self
    }

    pub fn with_fix_vacuum(mut self, fix: bool) -> Self {
        self.fix_vacuum = fix;
        self
    }

    pub fn with_no_air_when_fully_blocked(mut self, no_air: bool) -> Self {
        self.no_air_when_fully_blocked = no_air;
        self
    }

    /// Blocked on every edge - the tile is sealed off from all neighbors.
    pub fn fully_blocked(&self) -> bool {
        self.air_blocked && self.blocked_directions == directions::ALL
    }

    /// Whether gas may cross the given edge (one `directions` bit).
    pub fn passable(&self, direction: u8) -> bool {
        !self.air_blocked || self.blocked_directions & direction == 0
    }
}

/// Optional per-structure overrides for derived helper markers. `None`
/// inherits the owning structure's value, both at creation and on every
/// subsequent mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirtightOverrides {
    pub blocked_directions: Option<u8>,
    pub fix_vacuum: Option<bool>,
    pub no_air_when_fully_blocked: Option<bool>,
}

impl AirtightOverrides {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Compute the marker a helper tile must carry so the diffusion pass treats
/// it exactly like its owning structure's tile.
///
/// The blocked flag always follows the owner. Direction set, fix-vacuum and
/// no-air settings follow the owner unless overridden. Directions are
/// rotated into grid frame by the owner's facing so the helper can be read
/// without knowing who owns it.
pub fn helper_state(
    primary: &AirtightState,
    overrides: &AirtightOverrides,
    orientation: Orientation,
) -> AirtightState {
    let local_dirs = overrides
        .blocked_directions
        .unwrap_or(primary.blocked_directions);
    AirtightState {
        air_blocked: primary.air_blocked,
        blocked_directions: rotate_directions(local_dirs, orientation),
        fix_vacuum: overrides.fix_vacuum.unwrap_or(primary.fix_vacuum),
        no_air_when_fully_blocked: overrides
            .no_air_when_fully_blocked
            .unwrap_or(primary.no_air_when_fully_blocked),
    }
}
