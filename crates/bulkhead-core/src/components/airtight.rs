//! Airtight components: the per-tile marker, the multi-tile descriptor and
//! the helper back-pointer.

use bulkhead_logic::airtight::AirtightOverrides;
use bulkhead_logic::tiles::TileVec;
use hecs::Entity;
use serde::{Deserialize, Serialize};

// The single-tile marker is defined in the pure-logic crate and attached to
// entities directly as a component.
pub use bulkhead_logic::airtight::AirtightState;

/// Lifecycle of a multi-tile descriptor. `TornDown` is terminal: a
/// descriptor whose owner was destroyed never spawns helpers again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiTilePhase {
    #[default]
    Uninitialized,
    /// Helpers exist and are mirrored on every owner marker change.
    Active,
    TornDown,
}

/// Descriptor for structures whose airtight footprint covers more than one
/// tile. The owning entity keeps its own [`AirtightState`] for its anchor
/// tile; each listed offset gets a spawned helper entity carrying a derived
/// marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiTileAirtight {
    /// Extra tiles in the structure's local frame. The anchor tile (0, 0)
    /// is implicit and never listed.
    pub additional_tiles: Vec<TileVec>,
    /// Optional marker overrides applied to every helper instead of the
    /// owner's raw values.
    pub overrides: AirtightOverrides,
    /// Live helper entities, one per resolved offset. Rebuilt at runtime;
    /// never persisted.
    #[serde(skip)]
    pub helpers: Vec<Entity>,
    #[serde(skip)]
    pub phase: MultiTilePhase,
}

impl MultiTileAirtight {
    /// Build a descriptor from local offsets. Duplicates and the implicit
    /// anchor offset (0, 0) are dropped.
    pub fn new(additional_tiles: Vec<TileVec>) -> Self {
        let mut tiles = Vec::with_capacity(additional_tiles.len());
        for tile in additional_tiles {
            if tile != TileVec::ZERO && !tiles.contains(&tile) {
                tiles.push(tile);
            }
        }
        Self {
            additional_tiles: tiles,
            overrides: AirtightOverrides::none(),
            helpers: Vec::new(),
            phase: MultiTilePhase::Uninitialized,
        }
    }

    pub fn with_overrides(mut self, overrides: AirtightOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn is_active(&self) -> bool {
        self.phase == MultiTilePhase::Active
    }
}

/// Marks a spawned seal helper and points back at its owning structure.
/// Helpers are owned exclusively: all marker changes flow through the owner.
#[derive(Debug, Clone, Copy)]
pub struct AirtightHelper {
    pub owner: Entity,
}
