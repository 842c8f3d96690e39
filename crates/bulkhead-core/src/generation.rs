//! Demo station generation.
//!
//! Builds a minimal but playable layout: a hull around the grid perimeter
//! and a dividing bulkhead pierced by wide airlocks. Enough structure for
//! the harness and tests to exercise placement, mirroring and teardown on
//! a realistic map.

use crate::components::DoorKind;
use crate::engine::{StationEngine, StructureSpec};
use bulkhead_logic::tiles::{Orientation, TileVec};
use hecs::Entity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Generation parameters. Grid dimensions come from the engine.
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub name: String,
    /// Airlocks piercing the central bulkhead.
    pub airlock_count: u32,
    pub seed: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: "Meridian Station".to_string(),
            airlock_count: 3,
            seed: 42,
        }
    }
}

/// Entities created by generation, grouped by role.
#[derive(Debug, Clone)]
pub struct StationLayout {
    pub name: String,
    pub hull: Vec<Entity>,
    pub bulkhead: Vec<Entity>,
    pub airlocks: Vec<Entity>,
    /// Column of the dividing bulkhead.
    pub bulkhead_x: i32,
}

/// Generate hull, bulkhead and airlocks onto the engine's grid.
pub fn generate_station(engine: &mut StationEngine, config: &StationConfig) -> StationLayout {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let width = engine.grid.width();
    let height = engine.grid.height();
    let bulkhead_x = width / 2;

    let mut hull = Vec::new();
    for x in 0..width {
        for y in [0, height - 1] {
            hull.extend(place_wall(engine, x, y));
        }
    }
    for y in 1..height - 1 {
        for x in [0, width - 1] {
            hull.extend(place_wall(engine, x, y));
        }
    }

    // Airlocks run vertically along the bulkhead: one per band of interior
    // height, at a random offset inside its band.
    let interior = height - 2;
    let mut airlocks = Vec::new();
    let mut door_tiles: HashSet<i32> = HashSet::new();
    if config.airlock_count > 0 && interior > 0 {
        let band = interior / config.airlock_count as i32;
        for i in 0..config.airlock_count as i32 {
            let kind = if rng.gen_bool(0.5) {
                DoorKind::Wide
            } else {
                DoorKind::Triple
            };
            let band_start = 1 + i * band;
            let max_start = band_start + band - kind.span();
            if max_start < band_start {
                log::warn!(
                    "band {i} of {} tiles cannot fit a {kind:?} airlock; skipping",
                    band
                );
                continue;
            }
            let y0 = rng.gen_range(band_start..=max_start);
            let spec = StructureSpec::new(format!("{} Airlock {}", config.name, i + 1), TileVec::new(bulkhead_x, y0))
                // West rotates the local +x span onto grid +y.
                .oriented(Orientation::West)
                .door(kind);
            if let Some(entity) = engine.place_structure(spec) {
                for y in y0..y0 + kind.span() {
                    door_tiles.insert(y);
                }
                airlocks.push(entity);
            }
        }
    }

    let mut bulkhead = Vec::new();
    for y in 1..height - 1 {
        if !door_tiles.contains(&y) {
            bulkhead.extend(place_wall(engine, bulkhead_x, y));
        }
    }

    log::info!(
        "generated {}: {} hull tiles, {} bulkhead tiles, {} airlocks",
        config.name,
        hull.len(),
        bulkhead.len(),
        airlocks.len()
    );

    StationLayout {
        name: config.name.clone(),
        hull,
        bulkhead,
        airlocks,
        bulkhead_x,
    }
}

fn place_wall(engine: &mut StationEngine, x: i32, y: i32) -> Option<Entity> {
    engine.place_structure(StructureSpec::new("Hull Plating", TileVec::new(x, y)).sealed())
}
