//! Door behavior feeding the airtight path.
//!
//! A door's open state is the only thing gameplay toggles; the translation
//! to blocking markers (and, for wide doors, to every spanned tile) happens
//! through `airtight::set_air_blocked`. Powered doors fail open on power
//! loss so nobody is trapped behind a dead airlock.

use crate::components::Door;
use crate::systems::airtight;
use bulkhead_logic::tiles::TileVec;
use hecs::{Entity, World};

/// Open or close a door. The seal on every tile the door spans follows.
pub fn set_door_open(world: &World, entity: Entity, open: bool, dirty: &mut Vec<TileVec>) {
    let changed = {
        let Ok(mut door) = world.get::<&mut Door>(entity) else {
            return;
        };
        if door.open == open {
            false
        } else {
            door.open = open;
            true
        }
    };
    if !changed {
        return;
    }
    airtight::set_air_blocked(world, entity, !open, dirty);
}

/// Fail powered doors open while station power is down. Doors opened this
/// way stay open once power returns; closing them is a deliberate act.
pub fn tick_doors(world: &World, power_online: bool, dirty: &mut Vec<TileVec>) {
    if power_online {
        return;
    }
    let stuck: Vec<Entity> = world
        .query::<&Door>()
        .iter()
        .filter(|(_, door)| door.powered && !door.open)
        .map(|(entity, _)| entity)
        .collect();
    for entity in stuck {
        log::info!("power lost; door {entity:?} fails open");
        set_door_open(world, entity, true, dirty);
    }
}
