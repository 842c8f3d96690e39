//! The station tile grid: bounds, offset resolution and the anchored-entity
//! index the atmosphere layer queries.
//!
//! The grid owns no gas state. It answers two questions for the rest of the
//! simulation: "where does this local offset land?" and "which anchored
//! entities sit on this tile?". The diffusion pass reads blocking markers
//! through [`StationGrid::airtight_at`] and treats helper tiles identically
//! to native single-tile blockers.

use crate::components::{AirtightState, Placement};
use bulkhead_logic::tiles::{Orientation, TileVec};
use hecs::{Entity, World};
use std::collections::HashMap;

const NO_ENTITIES: &[Entity] = &[];

/// Rectangular tile lattice with a per-tile index of anchored entities.
#[derive(Debug, Clone, Default)]
pub struct StationGrid {
    width: i32,
    height: i32,
    anchored: HashMap<TileVec, Vec<Entity>>,
}

impl StationGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            anchored: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, tile: TileVec) -> bool {
        tile.x >= 0 && tile.x < self.width && tile.y >= 0 && tile.y < self.height
    }

    /// Resolve a local-frame offset against a base tile and facing.
    /// Returns `None` when the resulting tile falls off the grid.
    pub fn resolve(
        &self,
        base: TileVec,
        offset: TileVec,
        orientation: Orientation,
    ) -> Option<TileVec> {
        let tile = base + orientation.rotate_offset(offset);
        self.in_bounds(tile).then_some(tile)
    }

    /// Register an entity as anchored on a tile. Idempotent per entity.
    pub fn anchor(&mut self, tile: TileVec, entity: Entity) {
        let bucket = self.anchored.entry(tile).or_default();
        if !bucket.contains(&entity) {
            bucket.push(entity);
        }
    }

    /// Remove an entity from a tile's anchored set. Missing entries are a
    /// no-op.
    pub fn unanchor(&mut self, tile: TileVec, entity: Entity) {
        if let Some(bucket) = self.anchored.get_mut(&tile) {
            bucket.retain(|e| *e != entity);
            if bucket.is_empty() {
                self.anchored.remove(&tile);
            }
        }
    }

    /// All entities anchored on a tile.
    pub fn anchored_at(&self, tile: TileVec) -> &[Entity] {
        self.anchored
            .get(&tile)
            .map(Vec::as_slice)
            .unwrap_or(NO_ENTITIES)
    }

    /// Enumerate the airtight markers present on a tile, helpers included.
    pub fn airtight_at(&self, world: &World, tile: TileVec) -> Vec<(Entity, AirtightState)> {
        self.anchored_at(tile)
            .iter()
            .filter_map(|&entity| {
                world
                    .get::<&AirtightState>(entity)
                    .ok()
                    .map(|state| (entity, *state))
            })
            .collect()
    }

    /// Whether any anchored entity on the tile carries an airtight marker.
    pub fn has_airtight_at(&self, world: &World, tile: TileVec) -> bool {
        self.anchored_at(tile)
            .iter()
            .any(|&entity| world.get::<&AirtightState>(entity).is_ok())
    }

    /// Whether the tile currently blocks gas flow on every edge.
    pub fn tile_sealed(&self, world: &World, tile: TileVec) -> bool {
        self.airtight_at(world, tile)
            .iter()
            .any(|(_, state)| state.fully_blocked())
    }

    /// Tiles that currently have at least one anchored entity. Used when a
    /// whole-station refresh is needed (e.g. after loading a save).
    pub fn occupied_tiles(&self) -> impl Iterator<Item = TileVec> + '_ {
        self.anchored.keys().copied()
    }

    /// Verify the index against the world: every indexed entity must still
    /// be alive and placed on the tile it is indexed under. Returns the
    /// offending entries. Debug aid for the harness and tests.
    pub fn check_consistency(&self, world: &World) -> Vec<(TileVec, Entity)> {
        let mut bad = Vec::new();
        for (&tile, bucket) in &self.anchored {
            for &entity in bucket {
                let placed_here = world
                    .get::<&Placement>(entity)
                    .map(|p| p.anchored && p.tile == tile)
                    .unwrap_or(false);
                if !placed_here {
                    bad.push((tile, entity));
                }
            }
        }
        bad
    }
}
