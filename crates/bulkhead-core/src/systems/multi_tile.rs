//! Multi-tile airtight synchronization.
//!
//! A structure carrying a [`MultiTileAirtight`] descriptor owns one seal
//! helper entity per extra tile it spans. This module is the only writer of
//! those helpers: it creates them when the owner is anchored, keeps their
//! markers in lock-step with the owner's, and destroys them when the owner
//! is destroyed. Helpers never outlive their owner.

use crate::components::{
    AirtightHelper, AirtightState, MultiTileAirtight, MultiTilePhase, Placement,
};
use crate::grid::StationGrid;
use bulkhead_logic::airtight::helper_state;
use bulkhead_logic::tiles::TileVec;
use hecs::{Entity, World};

/// Resolve a structure's extra tiles and spawn one seal helper per tile.
///
/// No-op unless the descriptor is `Uninitialized`, the structure is
/// anchored, and it carries an airtight marker of its own. Offsets that
/// fall off the grid or land on a tile that already has an airtight entity
/// are skipped with a log entry; the remaining helpers are still created.
pub fn init_helpers(
    world: &mut World,
    grid: &mut StationGrid,
    entity: Entity,
    dirty: &mut Vec<TileVec>,
) {
    let (offsets, overrides, base, orientation) = {
        let Ok(multi) = world.get::<&MultiTileAirtight>(entity) else {
            return;
        };
        if multi.phase != MultiTilePhase::Uninitialized {
            return;
        }
        let Ok(placement) = world.get::<&Placement>(entity) else {
            return;
        };
        if !placement.anchored {
            return;
        }
        (
            multi.additional_tiles.clone(),
            multi.overrides,
            placement.tile,
            placement.orientation,
        )
    };
    let Ok(primary) = world.get::<&AirtightState>(entity).map(|s| *s) else {
        log::warn!("{entity:?} spans extra tiles but has no airtight marker; nothing to seal");
        return;
    };

    let state = helper_state(&primary, &overrides, orientation);
    let mut helpers = Vec::with_capacity(offsets.len());
    for offset in offsets {
        let Some(tile) = grid.resolve(base, offset, orientation) else {
            log::warn!("seal helper offset {offset} of {entity:?} falls off the grid; skipping");
            continue;
        };
        if grid.has_airtight_at(world, tile) {
            log::debug!("tile {tile} already carries an airtight entity; skipping helper");
            continue;
        }

        let helper = world.spawn((
            Placement::new(tile).with_orientation(orientation),
            state,
            AirtightHelper { owner: entity },
        ));
        grid.anchor(tile, helper);
        dirty.push(tile);
        helpers.push(helper);
    }

    if let Ok(mut multi) = world.get::<&mut MultiTileAirtight>(entity) {
        multi.helpers = helpers;
        multi.phase = MultiTilePhase::Active;
    }
}

/// Push the owner's current marker onto every live helper.
///
/// Must run synchronously inside whatever operation changed the owner's
/// marker, so the diffusion pass never reads a primary updated but helpers
/// stale. Helpers that died through some unrelated path are skipped.
pub fn sync_helpers(world: &World, entity: Entity, dirty: &mut Vec<TileVec>) {
    let (helpers, overrides, orientation) = {
        let Ok(multi) = world.get::<&MultiTileAirtight>(entity) else {
            return;
        };
        if !multi.is_active() {
            return;
        }
        let orientation = world
            .get::<&Placement>(entity)
            .map(|p| p.orientation)
            .unwrap_or_default();
        (multi.helpers.clone(), multi.overrides, orientation)
    };
    let Ok(primary) = world.get::<&AirtightState>(entity).map(|s| *s) else {
        return;
    };

    let state = helper_state(&primary, &overrides, orientation);
    for helper in helpers {
        let Ok(mut marker) = world.get::<&mut AirtightState>(helper) else {
            continue;
        };
        if *marker == state {
            continue;
        }
        *marker = state;
        drop(marker);
        if let Ok(placement) = world.get::<&Placement>(helper) {
            dirty.push(placement.tile);
        }
    }
}

/// Destroy the helpers of a still-live owner and return the descriptor to
/// `Uninitialized`. Used when the owner is unanchored or relocated; a later
/// anchor re-resolves from scratch.
pub fn release_helpers(
    world: &mut World,
    grid: &mut StationGrid,
    entity: Entity,
    dirty: &mut Vec<TileVec>,
) {
    let helpers = {
        let Ok(mut multi) = world.get::<&mut MultiTileAirtight>(entity) else {
            return;
        };
        if !multi.is_active() {
            return;
        }
        multi.phase = MultiTilePhase::Uninitialized;
        std::mem::take(&mut multi.helpers)
    };
    destroy_helpers(world, grid, &helpers, dirty);
}

/// Destruction cascade: destroy every helper and mark the descriptor
/// `TornDown`. Runs for every destruction path and never fails - helpers
/// already gone are a no-op each.
pub fn teardown(
    world: &mut World,
    grid: &mut StationGrid,
    entity: Entity,
    dirty: &mut Vec<TileVec>,
) {
    let helpers = {
        let Ok(mut multi) = world.get::<&mut MultiTileAirtight>(entity) else {
            return;
        };
        if multi.phase == MultiTilePhase::TornDown {
            return;
        }
        multi.phase = MultiTilePhase::TornDown;
        std::mem::take(&mut multi.helpers)
    };
    destroy_helpers(world, grid, &helpers, dirty);
}

/// Anchoring re-resolves helpers, unanchoring releases them.
pub fn handle_anchor_changed(
    world: &mut World,
    grid: &mut StationGrid,
    entity: Entity,
    anchored: bool,
    dirty: &mut Vec<TileVec>,
) {
    if anchored {
        init_helpers(world, grid, entity, dirty);
    } else {
        release_helpers(world, grid, entity, dirty);
    }
}

/// Relocation or re-orientation: helpers are resolved from scratch at the
/// new placement.
pub fn handle_moved(
    world: &mut World,
    grid: &mut StationGrid,
    entity: Entity,
    dirty: &mut Vec<TileVec>,
) {
    release_helpers(world, grid, entity, dirty);
    init_helpers(world, grid, entity, dirty);
}

fn destroy_helpers(
    world: &mut World,
    grid: &mut StationGrid,
    helpers: &[Entity],
    dirty: &mut Vec<TileVec>,
) {
    for &helper in helpers {
        if let Some(tile) = world.get::<&Placement>(helper).ok().map(|p| p.tile) {
            grid.unanchor(tile, helper);
            dirty.push(tile);
        }
        let _ = world.despawn(helper);
    }
}
