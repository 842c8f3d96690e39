//! Simulation engine - owns the world, the grid and the per-tick command
//! queue.
//!
//! Gameplay code queues [`Command`]s (or calls the direct methods, which
//! are the same operations); `tick` drains the queue in order. Each
//! command's mutation and its helper mirroring complete before the next
//! command is applied, so the atmosphere layer, which runs after `tick`,
//! only ever sees consistent primary/helper pairs. Tiles whose blocking set
//! changed are collected in a dirty list for the diffusion pass to drain.

use crate::components::{
    AirtightHelper, AirtightState, Door, DoorKind, MultiTileAirtight, Placement, Structure,
};
use crate::generation::{StationConfig, StationLayout};
use crate::grid::StationGrid;
use crate::persistence::{self, SaveError};
use crate::systems::{airtight, doors, multi_tile};
use bulkhead_logic::airtight::AirtightOverrides;
use bulkhead_logic::tiles::{Orientation, TileVec};
use hecs::{Entity, World};
use std::collections::HashSet;

/// Everything needed to place one structure on the grid.
#[derive(Debug, Clone)]
pub struct StructureSpec {
    pub name: String,
    pub tile: TileVec,
    pub orientation: Orientation,
    pub airtight: Option<AirtightState>,
    pub additional_tiles: Vec<TileVec>,
    pub overrides: AirtightOverrides,
    pub door: Option<DoorKind>,
}

impl StructureSpec {
    pub fn new(name: impl Into<String>, tile: TileVec) -> Self {
        Self {
            name: name.into(),
            tile,
            orientation: Orientation::North,
            airtight: None,
            additional_tiles: Vec::new(),
            overrides: AirtightOverrides::none(),
            door: None,
        }
    }

    pub fn oriented(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn airtight(mut self, state: AirtightState) -> Self {
        self.airtight = Some(state);
        self
    }

    /// Fully sealed with default marker settings. What walls use.
    pub fn sealed(self) -> Self {
        self.airtight(AirtightState::default())
    }

    /// Extra local-frame tiles beyond the anchor tile.
    pub fn spanning(mut self, additional_tiles: Vec<TileVec>) -> Self {
        self.additional_tiles = additional_tiles;
        self
    }

    pub fn overrides(mut self, overrides: AirtightOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Make this structure a door of the given span. Supplies a default
    /// sealed marker and the span's extra tiles unless already set.
    pub fn door(mut self, kind: DoorKind) -> Self {
        self.door = Some(kind);
        if self.airtight.is_none() {
            self.airtight = Some(AirtightState::default());
        }
        if self.additional_tiles.is_empty() {
            self.additional_tiles = kind.additional_tiles();
        }
        self
    }
}

/// Deferred operations, drained once per tick in queue order.
#[derive(Debug, Clone)]
pub enum Command {
    Place(StructureSpec),
    Destroy(Entity),
    SetAirBlocked { entity: Entity, blocked: bool },
    SetDoorOpen { entity: Entity, open: bool },
    SetPower(bool),
}

/// Main simulation engine for one station grid.
pub struct StationEngine {
    /// ECS world containing all entities
    pub world: World,
    /// Tile lattice and anchored-entity index
    pub grid: StationGrid,
    /// Simulation time in seconds since start
    pub sim_time: f64,
    power_online: bool,
    commands: Vec<Command>,
    dirty_tiles: Vec<TileVec>,
}

impl StationEngine {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            world: World::new(),
            grid: StationGrid::new(width, height),
            sim_time: 0.0,
            power_online: true,
            commands: Vec::new(),
            dirty_tiles: Vec::new(),
        }
    }

    /// Generate a demo station layout onto this engine's grid.
    pub fn generate(&mut self, config: &StationConfig) -> StationLayout {
        crate::generation::generate_station(self, config)
    }

    /// Place a structure. Returns `None` (with a log entry) when the anchor
    /// tile is off the grid. Multi-tile descriptors resolve their helpers
    /// before this returns.
    pub fn place_structure(&mut self, spec: StructureSpec) -> Option<Entity> {
        if !self.grid.in_bounds(spec.tile) {
            log::warn!("cannot place {:?} at {}: off the grid", spec.name, spec.tile);
            return None;
        }

        let entity = self.world.spawn((
            Structure::new(spec.name),
            Placement::new(spec.tile).with_orientation(spec.orientation),
        ));
        if let Some(state) = spec.airtight {
            let _ = self.world.insert_one(entity, state);
        }
        if let Some(kind) = spec.door {
            let _ = self.world.insert_one(entity, Door::new(kind));
        }
        if !spec.additional_tiles.is_empty() {
            let _ = self.world.insert_one(
                entity,
                MultiTileAirtight::new(spec.additional_tiles).with_overrides(spec.overrides),
            );
        }

        self.grid.anchor(spec.tile, entity);
        self.dirty_tiles.push(spec.tile);
        multi_tile::init_helpers(&mut self.world, &mut self.grid, entity, &mut self.dirty_tiles);
        Some(entity)
    }

    /// Destroy a structure. The helper cascade runs unconditionally before
    /// the entity itself is despawned, whatever the destruction reason.
    pub fn destroy_structure(&mut self, entity: Entity) {
        multi_tile::teardown(&mut self.world, &mut self.grid, entity, &mut self.dirty_tiles);

        if let Some(placement) = self.world.get::<&Placement>(entity).ok().map(|p| *p) {
            if placement.anchored {
                self.grid.unanchor(placement.tile, entity);
                self.dirty_tiles.push(placement.tile);
            }
        }
        let _ = self.world.despawn(entity);
    }

    /// Change a structure's blocked flag; helpers mirror synchronously.
    pub fn set_air_blocked(&mut self, entity: Entity, blocked: bool) {
        airtight::set_air_blocked(&self.world, entity, blocked, &mut self.dirty_tiles);
    }

    /// Open or close a door; the seal across its whole span follows.
    pub fn set_door_open(&mut self, entity: Entity, open: bool) {
        doors::set_door_open(&self.world, entity, open, &mut self.dirty_tiles);
    }

    /// Anchor or unanchor a structure. Unanchoring releases its helpers;
    /// re-anchoring resolves them again at the current placement.
    pub fn set_anchored(&mut self, entity: Entity, anchored: bool) {
        let tile = {
            let Ok(mut placement) = self.world.get::<&mut Placement>(entity) else {
                return;
            };
            if placement.anchored == anchored {
                return;
            }
            placement.anchored = anchored;
            placement.tile
        };
        if anchored {
            self.grid.anchor(tile, entity);
        } else {
            self.grid.unanchor(tile, entity);
        }
        self.dirty_tiles.push(tile);
        multi_tile::handle_anchor_changed(
            &mut self.world,
            &mut self.grid,
            entity,
            anchored,
            &mut self.dirty_tiles,
        );
    }

    /// Relocate and/or re-orient an anchored structure. Its helpers are
    /// released and resolved from scratch at the new placement.
    pub fn move_structure(&mut self, entity: Entity, tile: TileVec, orientation: Orientation) {
        if !self.grid.in_bounds(tile) {
            log::warn!("cannot move {entity:?} to {tile}: off the grid");
            return;
        }
        if self.world.get::<&AirtightHelper>(entity).is_ok() {
            log::warn!("{entity:?} is a seal helper; it moves with its primary");
            return;
        }
        let (old_tile, anchored) = {
            let Ok(mut placement) = self.world.get::<&mut Placement>(entity) else {
                return;
            };
            let old = placement.tile;
            placement.tile = tile;
            placement.orientation = orientation;
            (old, placement.anchored)
        };
        if anchored {
            self.grid.unanchor(old_tile, entity);
            self.grid.anchor(tile, entity);
            self.dirty_tiles.push(old_tile);
            self.dirty_tiles.push(tile);
            multi_tile::handle_moved(&mut self.world, &mut self.grid, entity, &mut self.dirty_tiles);
        }
    }

    pub fn set_power(&mut self, online: bool) {
        self.power_online = online;
    }

    pub fn power_online(&self) -> bool {
        self.power_online
    }

    /// Queue a command for the next tick.
    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Advance the simulation: drain queued commands in order, then run
    /// door behavior. Each command completes (mirroring included) before
    /// the next is applied.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.sim_time += delta_seconds as f64;

        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            self.apply(command);
        }

        doors::tick_doors(&self.world, self.power_online, &mut self.dirty_tiles);
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Place(spec) => {
                self.place_structure(spec);
            }
            Command::Destroy(entity) => self.destroy_structure(entity),
            Command::SetAirBlocked { entity, blocked } => self.set_air_blocked(entity, blocked),
            Command::SetDoorOpen { entity, open } => self.set_door_open(entity, open),
            Command::SetPower(online) => self.set_power(online),
        }
    }

    /// Tiles whose blocking set changed since the last drain, deduplicated
    /// in first-change order. The atmosphere pass consumes this.
    pub fn drain_dirty_tiles(&mut self) -> Vec<TileVec> {
        let mut seen = HashSet::new();
        std::mem::take(&mut self.dirty_tiles)
            .into_iter()
            .filter(|tile| seen.insert(*tile))
            .collect()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn entity_exists(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Live helpers owned by a structure, in offset order.
    pub fn helpers_of(&self, entity: Entity) -> Vec<Entity> {
        self.world
            .get::<&MultiTileAirtight>(entity)
            .map(|multi| multi.helpers.clone())
            .unwrap_or_default()
    }

    /// Airtight markers on a tile, helpers included.
    pub fn airtight_at(&self, tile: TileVec) -> Vec<(Entity, AirtightState)> {
        self.grid.airtight_at(&self.world, tile)
    }

    pub fn tile_sealed(&self, tile: TileVec) -> bool {
        self.grid.tile_sealed(&self.world, tile)
    }

    /// Count player-visible structures.
    pub fn structure_count(&self) -> usize {
        self.world.query::<&Structure>().iter().count()
    }

    /// Count live seal helpers.
    pub fn helper_count(&self) -> usize {
        self.world.query::<&AirtightHelper>().iter().count()
    }

    /// Count doors.
    pub fn door_count(&self) -> usize {
        self.world.query::<&Door>().iter().count()
    }

    /// Save station state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_station(
            writer,
            &self.world,
            &self.grid,
            self.sim_time,
            self.power_online,
        )
    }

    /// Load station state from a reader
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = persistence::load_station(reader)?;

        self.world = loaded.world;
        self.grid = loaded.grid;
        self.sim_time = loaded.sim_time;
        self.power_online = loaded.power_online;
        self.commands.clear();

        // Everything changed as far as the diffusion pass is concerned.
        self.dirty_tiles = self.grid.occupied_tiles().collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = StationEngine::new(16, 16);
        assert_eq!(engine.structure_count(), 0);
        assert_eq!(engine.helper_count(), 0);
        assert_eq!(engine.sim_time, 0.0);
    }

    #[test]
    fn test_place_off_grid_is_rejected() {
        let mut engine = StationEngine::new(4, 4);
        let placed = engine.place_structure(
            StructureSpec::new("Nowhere Wall", TileVec::new(9, 9)).sealed(),
        );
        assert!(placed.is_none());
        assert_eq!(engine.structure_count(), 0);
    }

    #[test]
    fn test_place_wide_door_creates_helper() {
        let mut engine = StationEngine::new(16, 16);
        let door = engine
            .place_structure(
                StructureSpec::new("Cargo Airlock", TileVec::new(4, 4)).door(DoorKind::Wide),
            )
            .unwrap();

        assert_eq!(engine.helpers_of(door).len(), 1);
        assert_eq!(engine.helper_count(), 1);
        assert!(engine.tile_sealed(TileVec::new(4, 4)));
        assert!(engine.tile_sealed(TileVec::new(5, 4)));
    }

    #[test]
    fn test_commands_apply_in_order() {
        let mut engine = StationEngine::new(16, 16);
        let door = engine
            .place_structure(
                StructureSpec::new("Dock Airlock", TileVec::new(2, 2)).door(DoorKind::Triple),
            )
            .unwrap();
        engine.drain_dirty_tiles();

        engine.queue(Command::SetDoorOpen {
            entity: door,
            open: true,
        });
        engine.queue(Command::SetDoorOpen {
            entity: door,
            open: false,
        });
        engine.tick(0.5);

        // Net effect: closed again, every tile sealed.
        assert!(engine.tile_sealed(TileVec::new(2, 2)));
        assert!(engine.tile_sealed(TileVec::new(3, 2)));
        assert!(engine.tile_sealed(TileVec::new(4, 2)));
        assert!((engine.sim_time - 0.5).abs() < 1e-9);

        // Both transitions touched the span.
        let dirty = engine.drain_dirty_tiles();
        assert!(dirty.contains(&TileVec::new(2, 2)));
        assert!(dirty.contains(&TileVec::new(4, 2)));
    }

    #[test]
    fn test_destroy_removes_helpers_and_index_entries() {
        let mut engine = StationEngine::new(16, 16);
        let door = engine
            .place_structure(
                StructureSpec::new("Hangar Door", TileVec::new(6, 6)).door(DoorKind::Triple),
            )
            .unwrap();
        let helpers = engine.helpers_of(door);
        assert_eq!(helpers.len(), 2);

        engine.destroy_structure(door);

        assert!(!engine.entity_exists(door));
        for helper in helpers {
            assert!(!engine.entity_exists(helper));
        }
        assert!(engine.airtight_at(TileVec::new(7, 6)).is_empty());
        assert!(engine.grid.check_consistency(&engine.world).is_empty());
    }

    #[test]
    fn test_move_reresolves_helpers() {
        let mut engine = StationEngine::new(16, 16);
        let door = engine
            .place_structure(
                StructureSpec::new("Freight Airlock", TileVec::new(2, 2)).door(DoorKind::Wide),
            )
            .unwrap();
        assert!(engine.tile_sealed(TileVec::new(3, 2)));

        engine.move_structure(door, TileVec::new(8, 8), Orientation::West);

        assert!(engine.airtight_at(TileVec::new(3, 2)).is_empty());
        // West span runs along +y.
        assert!(engine.tile_sealed(TileVec::new(8, 9)));
        assert_eq!(engine.helpers_of(door).len(), 1);
        assert!(engine.grid.check_consistency(&engine.world).is_empty());
    }

    #[test]
    fn test_power_loss_tick_opens_doors() {
        let mut engine = StationEngine::new(16, 16);
        let door = engine
            .place_structure(
                StructureSpec::new("Main Airlock", TileVec::new(4, 4)).door(DoorKind::Wide),
            )
            .unwrap();

        engine.queue(Command::SetPower(false));
        engine.tick(1.0);

        assert!(engine.world.get::<&Door>(door).unwrap().open);
        assert!(!engine.tile_sealed(TileVec::new(5, 4)));
    }

    #[test]
    fn test_dirty_tiles_deduplicate() {
        let mut engine = StationEngine::new(16, 16);
        let door = engine
            .place_structure(
                StructureSpec::new("Aft Airlock", TileVec::new(4, 4)).door(DoorKind::Wide),
            )
            .unwrap();
        engine.drain_dirty_tiles();

        engine.set_door_open(door, true);
        engine.set_door_open(door, false);

        let dirty = engine.drain_dirty_tiles();
        assert_eq!(dirty.len(), 2);
        assert!(engine.drain_dirty_tiles().is_empty());
    }
}
