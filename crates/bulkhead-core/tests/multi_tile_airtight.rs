//! Integration tests for multi-tile airtight synchronization.
//!
//! Exercises the full placement, mirroring and teardown lifecycle through
//! the engine, the way gameplay code drives it. All tests run in-process
//! with no rendering and no networking.

use bulkhead_core::components::DoorKind;
use bulkhead_core::engine::{Command, StationEngine, StructureSpec};
use bulkhead_logic::airtight::{directions, AirtightOverrides, AirtightState};
use bulkhead_logic::tiles::{Orientation, TileVec};

// ── Helpers ────────────────────────────────────────────────────────────

fn engine() -> StationEngine {
    StationEngine::new(16, 16)
}

/// A default-blocked structure spanning the given extra tiles.
fn spanning_structure(engine: &mut StationEngine, tile: TileVec, extra: Vec<TileVec>) -> hecs::Entity {
    engine
        .place_structure(
            StructureSpec::new("Test Structure", tile)
                .sealed()
                .spanning(extra),
        )
        .expect("placement on an in-bounds tile succeeds")
}

// ── Helper creation ────────────────────────────────────────────────────

#[test]
fn spawns_one_helper_per_additional_tile() {
    let mut engine = engine();
    let entity = spanning_structure(
        &mut engine,
        TileVec::new(5, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );

    let helpers = engine.helpers_of(entity);
    assert_eq!(helpers.len(), 2);
    for helper in helpers {
        assert!(engine.entity_exists(helper));
    }
    // Each helper carries its own blocking marker.
    assert_eq!(engine.airtight_at(TileVec::new(6, 5)).len(), 1);
    assert_eq!(engine.airtight_at(TileVec::new(7, 5)).len(), 1);
}

#[test]
fn helpers_start_with_the_owners_blocked_state() {
    let mut engine = engine();
    spanning_structure(
        &mut engine,
        TileVec::new(5, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );

    for tile in [TileVec::new(6, 5), TileVec::new(7, 5)] {
        let markers = engine.airtight_at(tile);
        assert_eq!(markers.len(), 1);
        assert!(markers[0].1.air_blocked);
    }
}

#[test]
fn double_wide_airlock_gets_exactly_one_helper() {
    let mut engine = engine();
    let airlock = engine
        .place_structure(
            StructureSpec::new("Double Airlock", TileVec::new(5, 5)).door(DoorKind::Wide),
        )
        .unwrap();

    assert_eq!(engine.helpers_of(airlock).len(), 1);
}

#[test]
fn triple_wide_airlock_gets_exactly_two_helpers() {
    let mut engine = engine();
    let airlock = engine
        .place_structure(
            StructureSpec::new("Triple Airlock", TileVec::new(5, 5)).door(DoorKind::Triple),
        )
        .unwrap();

    let helpers = engine.helpers_of(airlock);
    assert_eq!(helpers.len(), 2);
    // Both helpers carry independent markers on their own tiles.
    assert!(engine.tile_sealed(TileVec::new(6, 5)));
    assert!(engine.tile_sealed(TileVec::new(7, 5)));
}

#[test]
fn repeated_initialization_never_duplicates_helpers() {
    let mut engine = engine();
    let entity = spanning_structure(
        &mut engine,
        TileVec::new(5, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );

    // Unanchor/re-anchor cycles re-resolve but never stack helpers.
    for _ in 0..3 {
        engine.set_anchored(entity, false);
        engine.set_anchored(entity, true);
    }

    assert_eq!(engine.helpers_of(entity).len(), 2);
    assert_eq!(engine.helper_count(), 2);
    assert_eq!(engine.airtight_at(TileVec::new(6, 5)).len(), 1);
}

// ── Partial coverage ───────────────────────────────────────────────────

#[test]
fn offsets_off_the_grid_are_skipped_not_fatal() {
    let mut engine = engine();
    // Second extra tile lands at x = 16, off a 16-wide grid.
    let entity = spanning_structure(
        &mut engine,
        TileVec::new(14, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );

    let helpers = engine.helpers_of(entity);
    assert_eq!(helpers.len(), 1);

    // The surviving helper still mirrors.
    engine.set_air_blocked(entity, false);
    let markers = engine.airtight_at(TileVec::new(15, 5));
    assert_eq!(markers.len(), 1);
    assert!(!markers[0].1.air_blocked);
}

// ── State mirroring ────────────────────────────────────────────────────

#[test]
fn unblocking_the_owner_unblocks_every_helper() {
    let mut engine = engine();
    let entity = spanning_structure(
        &mut engine,
        TileVec::new(5, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );

    engine.set_air_blocked(entity, false);

    for tile in [TileVec::new(6, 5), TileVec::new(7, 5)] {
        let markers = engine.airtight_at(tile);
        assert!(!markers[0].1.air_blocked);
    }

    engine.set_air_blocked(entity, true);
    for tile in [TileVec::new(6, 5), TileVec::new(7, 5)] {
        assert!(engine.tile_sealed(tile));
    }
}

#[test]
fn helpers_stay_consistent_across_a_toggle_sequence() {
    let mut engine = engine();
    let entity = spanning_structure(&mut engine, TileVec::new(5, 5), vec![TileVec::new(1, 0)]);

    for blocked in [false, true, true, false, true] {
        engine.set_air_blocked(entity, blocked);
        let owner = engine.airtight_at(TileVec::new(5, 5))[0].1;
        let helper = engine.airtight_at(TileVec::new(6, 5))[0].1;
        assert_eq!(owner.air_blocked, blocked);
        assert_eq!(helper.air_blocked, owner.air_blocked);
    }
}

#[test]
fn direction_override_wins_over_the_owners_directions() {
    let mut engine = engine();
    let entity = engine
        .place_structure(
            StructureSpec::new("Vented Conveyor", TileVec::new(5, 5))
                .sealed()
                .spanning(vec![TileVec::new(1, 0)])
                .overrides(AirtightOverrides {
                    blocked_directions: Some(directions::NORTH | directions::SOUTH),
                    ..Default::default()
                }),
        )
        .unwrap();

    // Toggle the owner; the helper keeps its overridden direction set.
    engine.set_air_blocked(entity, false);
    engine.set_air_blocked(entity, true);

    let helper_marker = engine.airtight_at(TileVec::new(6, 5))[0].1;
    assert_eq!(
        helper_marker.blocked_directions,
        directions::NORTH | directions::SOUTH
    );
    assert!(helper_marker.air_blocked);
}

#[test]
fn vacuum_fix_override_applies_to_helpers_only() {
    let mut engine = engine();
    let entity = engine
        .place_structure(
            StructureSpec::new("Pressure Door", TileVec::new(5, 5))
                .airtight(AirtightState::default().with_fix_vacuum(false))
                .spanning(vec![TileVec::new(1, 0)])
                .overrides(AirtightOverrides {
                    fix_vacuum: Some(true),
                    ..Default::default()
                }),
        )
        .unwrap();

    let owner_marker = engine.airtight_at(TileVec::new(5, 5))[0].1;
    let helper_marker = engine.airtight_at(TileVec::new(6, 5))[0].1;
    assert!(!owner_marker.fix_vacuum);
    assert!(helper_marker.fix_vacuum);
    let _ = entity;
}

// ── Deletion cascade ───────────────────────────────────────────────────

#[test]
fn destroying_the_owner_destroys_every_helper() {
    let mut engine = engine();
    let entity = spanning_structure(
        &mut engine,
        TileVec::new(5, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );
    let helpers = engine.helpers_of(entity);
    assert_eq!(helpers.len(), 2);

    engine.destroy_structure(entity);

    assert!(!engine.entity_exists(entity));
    for helper in helpers {
        assert!(!engine.entity_exists(helper));
    }
    assert_eq!(engine.helper_count(), 0);
}

#[test]
fn cascade_tolerates_a_helper_destroyed_elsewhere() {
    let mut engine = engine();
    let entity = spanning_structure(
        &mut engine,
        TileVec::new(5, 5),
        vec![TileVec::new(1, 0), TileVec::new(2, 0)],
    );
    let helpers = engine.helpers_of(entity);

    // A tile-clearing tool got one helper first.
    engine.destroy_structure(helpers[0]);
    assert!(!engine.entity_exists(helpers[0]));

    engine.destroy_structure(entity);

    for helper in helpers {
        assert!(!engine.entity_exists(helper));
    }
    assert_eq!(engine.helper_count(), 0);
}

#[test]
fn queued_destruction_cascades_too() {
    let mut engine = engine();
    let airlock = engine
        .place_structure(
            StructureSpec::new("Brig Airlock", TileVec::new(5, 5)).door(DoorKind::Triple),
        )
        .unwrap();
    let helpers = engine.helpers_of(airlock);

    engine.queue(Command::Destroy(airlock));
    engine.tick(1.0 / 60.0);

    for helper in helpers {
        assert!(!engine.entity_exists(helper));
    }
}

// ── Orientation ────────────────────────────────────────────────────────

#[test]
fn spans_follow_the_structures_facing() {
    let mut engine = engine();
    let airlock = engine
        .place_structure(
            StructureSpec::new("Service Airlock", TileVec::new(5, 5))
                .oriented(Orientation::West)
                .door(DoorKind::Wide),
        )
        .unwrap();

    // West rotates the local +x span onto grid +y.
    assert!(engine.tile_sealed(TileVec::new(5, 6)));
    assert!(engine.airtight_at(TileVec::new(6, 5)).is_empty());
    assert_eq!(engine.helpers_of(airlock).len(), 1);
}

// ── Atmosphere-layer view ──────────────────────────────────────────────

#[test]
fn dirty_tiles_cover_the_whole_span_of_a_change() {
    let mut engine = engine();
    let airlock = engine
        .place_structure(
            StructureSpec::new("Dock Airlock", TileVec::new(5, 5)).door(DoorKind::Triple),
        )
        .unwrap();
    engine.drain_dirty_tiles();

    engine.set_door_open(airlock, true);

    let dirty = engine.drain_dirty_tiles();
    for tile in [TileVec::new(5, 5), TileVec::new(6, 5), TileVec::new(7, 5)] {
        assert!(dirty.contains(&tile), "tile {tile} missing from dirty set");
    }
}

#[test]
fn helper_tiles_read_like_native_blockers() {
    let mut engine = engine();
    let wall_tile = TileVec::new(3, 3);
    engine.place_structure(StructureSpec::new("Wall", wall_tile).sealed());
    let airlock = engine
        .place_structure(
            StructureSpec::new("Airlock", TileVec::new(5, 5)).door(DoorKind::Wide),
        )
        .unwrap();

    let wall_marker = engine.airtight_at(wall_tile)[0].1;
    let helper_marker = engine.airtight_at(TileVec::new(6, 5))[0].1;
    assert_eq!(wall_marker.air_blocked, helper_marker.air_blocked);
    assert_eq!(wall_marker.blocked_directions, helper_marker.blocked_directions);
    let _ = airlock;
}
