//! Airtight marker mutation.
//!
//! All runtime changes to a structure's blocking state go through this
//! module so multi-tile helpers are mirrored before the change is
//! considered finished. Helpers themselves are rejected here: their markers
//! are owned by their primary and only ever written through the mirror
//! path.

use crate::components::{AirtightHelper, AirtightState, Placement};
use crate::systems::multi_tile;
use bulkhead_logic::airtight::directions;
use bulkhead_logic::tiles::TileVec;
use hecs::{Entity, World};

/// Set the blocked flag on a structure's marker and mirror the change onto
/// its helpers in the same step. Changed tiles are appended to `dirty` for
/// the diffusion pass.
pub fn set_air_blocked(world: &World, entity: Entity, blocked: bool, dirty: &mut Vec<TileVec>) {
    if is_helper(world, entity) {
        log::warn!("{entity:?} is a seal helper; its marker is owned by its primary");
        return;
    }
    let changed = {
        let Ok(mut marker) = world.get::<&mut AirtightState>(entity) else {
            return;
        };
        if marker.air_blocked == blocked {
            false
        } else {
            marker.air_blocked = blocked;
            true
        }
    };
    if !changed {
        return;
    }

    if let Ok(placement) = world.get::<&Placement>(entity) {
        dirty.push(placement.tile);
    }
    // Helpers must be consistent before the next diffusion read.
    multi_tile::sync_helpers(world, entity, dirty);
}

/// Replace a structure's blocked-direction set (local frame) and mirror.
pub fn set_blocked_directions(world: &World, entity: Entity, dirs: u8, dirty: &mut Vec<TileVec>) {
    if is_helper(world, entity) {
        log::warn!("{entity:?} is a seal helper; its marker is owned by its primary");
        return;
    }
    let changed = {
        let Ok(mut marker) = world.get::<&mut AirtightState>(entity) else {
            return;
        };
        let dirs = dirs & directions::ALL;
        if marker.blocked_directions == dirs {
            false
        } else {
            marker.blocked_directions = dirs;
            true
        }
    };
    if !changed {
        return;
    }

    if let Ok(placement) = world.get::<&Placement>(entity) {
        dirty.push(placement.tile);
    }
    multi_tile::sync_helpers(world, entity, dirty);
}

fn is_helper(world: &World, entity: Entity) -> bool {
    world.get::<&AirtightHelper>(entity).is_ok()
}
