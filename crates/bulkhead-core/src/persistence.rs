//! Save/Load functionality for persisting station state
//!
//! Uses bincode for efficient binary serialization. Components are
//! serialized individually then reconstructed on load. Seal helpers are
//! never written: they are derived state, and every multi-tile descriptor
//! re-resolves its helpers when the save is loaded.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::{
    AirtightHelper, AirtightState, Door, MultiTileAirtight, Placement, Structure,
};
use crate::grid::StationGrid;
use crate::systems::multi_tile;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the station state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    /// Station power state
    pub power_online: bool,
    /// Grid dimensions
    pub grid_width: i32,
    pub grid_height: i32,
    /// All player-visible structures with their components
    pub structures: Vec<SerializableStructure>,
}

/// All possible components for a structure, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableStructure {
    pub structure: Option<Structure>,
    pub placement: Option<Placement>,
    pub airtight: Option<AirtightState>,
    pub multi_tile: Option<MultiTileAirtight>,
    pub door: Option<Door>,
}

/// Extract all non-helper entities from a world into serializable form
fn serialize_structures(world: &World) -> Vec<SerializableStructure> {
    let mut structures = Vec::new();

    for entity_ref in world.iter() {
        // Helpers are derived state; they are rebuilt on load.
        if entity_ref.get::<&AirtightHelper>().is_some() {
            continue;
        }

        let mut ss = SerializableStructure::default();
        if let Some(c) = entity_ref.get::<&Structure>() {
            ss.structure = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Placement>() {
            ss.placement = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&AirtightState>() {
            ss.airtight = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&MultiTileAirtight>() {
            ss.multi_tile = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Door>() {
            ss.door = Some(*c);
        }

        structures.push(ss);
    }

    structures
}

/// Spawn a structure with all its components
fn spawn_structure(world: &mut World, ss: SerializableStructure) -> hecs::Entity {
    let entity = world.spawn(());

    if let Some(c) = ss.structure {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = ss.placement {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = ss.airtight {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = ss.multi_tile {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = ss.door {
        let _ = world.insert_one(entity, c);
    }

    entity
}

/// Save the complete station to a writer
pub fn save_station<W: Write>(
    writer: W,
    world: &World,
    grid: &StationGrid,
    sim_time: f64,
    power_online: bool,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time,
        power_online,
        grid_width: grid.width(),
        grid_height: grid.height(),
        structures: serialize_structures(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a station from a reader. Structures are re-anchored into a fresh
/// grid index and multi-tile descriptors resolve their helpers again.
pub fn load_station<R: Read>(reader: R) -> Result<LoadedStation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    let mut grid = StationGrid::new(save_data.grid_width, save_data.grid_height);

    let mut spawned = Vec::with_capacity(save_data.structures.len());
    for ss in save_data.structures {
        let entity = spawn_structure(&mut world, ss);
        spawned.push(entity);
    }
    for &entity in &spawned {
        if let Some(placement) = world.get::<&Placement>(entity).ok().map(|p| *p) {
            if placement.anchored {
                grid.anchor(placement.tile, entity);
            }
        }
    }
    // Derive helpers after every anchor is indexed, so occupied-tile checks
    // see the full map.
    let mut dirty = Vec::new();
    for entity in spawned {
        multi_tile::init_helpers(&mut world, &mut grid, entity, &mut dirty);
    }

    Ok(LoadedStation {
        world,
        grid,
        sim_time: save_data.sim_time,
        power_online: save_data.power_online,
    })
}

/// Result of loading a station
pub struct LoadedStation {
    pub world: World,
    pub grid: StationGrid,
    pub sim_time: f64,
    pub power_online: bool,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
