//! Bulkhead Headless Simulation Harness
//!
//! Validates the airtight synchronization layer and data without a client.
//! Runs entirely in-process: no rendering, no networking, no persistence
//! beyond a scratch buffer.
//!
//! Usage:
//!   cargo run -p bulkhead-simtest
//!   cargo run -p bulkhead-simtest -- --verbose

use bulkhead_core::components::{DoorKind, MultiTileAirtight};
use bulkhead_core::engine::{Command, StationEngine, StructureSpec};
use bulkhead_core::generation::StationConfig;
use bulkhead_logic::airtight::{directions, helper_state, rotate_directions, AirtightOverrides, AirtightState};
use bulkhead_logic::tiles::{Orientation, TileVec};
use serde::Deserialize;

// ── Station layout manifest (shared with tooling) ───────────────────────
const LAYOUT_JSON: &str = include_str!("../../../data/station_layout.json");

#[derive(Debug, Deserialize)]
struct LayoutSpec {
    grid: GridSpec,
    structures: Vec<StructureDef>,
}

#[derive(Debug, Deserialize)]
struct GridSpec {
    width: i32,
    height: i32,
}

#[derive(Debug, Deserialize)]
struct StructureDef {
    name: String,
    x: i32,
    y: i32,
    #[serde(default)]
    orientation: Orientation,
    #[serde(default)]
    door: Option<DoorKind>,
}

impl StructureDef {
    fn spec(&self) -> StructureSpec {
        let spec = StructureSpec::new(self.name.clone(), TileVec::new(self.x, self.y))
            .oriented(self.orientation);
        match self.door {
            Some(kind) => spec.door(kind),
            None => spec.sealed(),
        }
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Bulkhead Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Tile and direction math
    results.extend(validate_tile_math());

    // 2. Mirror rules (pure function sweep)
    results.extend(validate_mirror_rules());

    // 3. Layout manifest placement
    results.extend(validate_layout_manifest());

    // 4. Airlock lifecycle on a live engine
    results.extend(validate_airlock_lifecycle());

    // 5. Destruction cascade
    results.extend(validate_cascade());

    // 6. Partial coverage at the grid edge
    results.extend(validate_partial_coverage());

    // 7. Power failure behavior
    results.extend(validate_power_failure());

    // 8. Save/load roundtrip
    results.extend(validate_persistence());

    // 9. Generated station coherence
    results.extend(validate_generation());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Tile and direction math ──────────────────────────────────────────

fn validate_tile_math() -> Vec<TestResult> {
    let mut results = Vec::new();

    let east = TileVec::new(1, 0);
    let full_circle = {
        let mut v = east;
        for _ in 0..4 {
            v = Orientation::East.rotate_offset(v);
        }
        v
    };
    results.push(check(
        "rotation full circle",
        full_circle == east,
        format!("(1,0) after four quarter turns = {full_circle}"),
    ));

    let west_span = Orientation::West.rotate_offset(east);
    results.push(check(
        "west facing spans +y",
        west_span == TileVec::new(0, 1),
        format!("West * (1,0) = {west_span}"),
    ));

    let mut dir_ok = true;
    for o in [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ] {
        // ALL and NONE are rotation-invariant; singles stay single bits.
        dir_ok &= rotate_directions(directions::ALL, o) == directions::ALL;
        dir_ok &= rotate_directions(directions::NONE, o) == directions::NONE;
        dir_ok &= rotate_directions(directions::NORTH, o).count_ones() == 1;
    }
    results.push(check(
        "direction bitfield rotation",
        dir_ok,
        "ALL/NONE invariant, single bits stay single",
    ));

    results
}

// ── 2. Mirror rules ─────────────────────────────────────────────────────

fn validate_mirror_rules() -> Vec<TestResult> {
    let mut results = Vec::new();

    let mut inherit_ok = true;
    for blocked in [true, false] {
        for fix in [true, false] {
            let primary = AirtightState::default()
                .with_blocked(blocked)
                .with_fix_vacuum(fix);
            let helper = helper_state(&primary, &AirtightOverrides::none(), Orientation::North);
            inherit_ok &= helper == primary;
        }
    }
    results.push(check(
        "mirror inherits without overrides",
        inherit_ok,
        "helper equals primary across blocked/fix-vacuum sweep",
    ));

    let overrides = AirtightOverrides {
        blocked_directions: Some(directions::NORTH),
        fix_vacuum: Some(true),
        no_air_when_fully_blocked: Some(false),
    };
    let primary = AirtightState::default().with_blocked(false);
    let helper = helper_state(&primary, &overrides, Orientation::East);
    let override_ok = !helper.air_blocked
        && helper.blocked_directions == directions::EAST
        && helper.fix_vacuum
        && !helper.no_air_when_fully_blocked;
    results.push(check(
        "mirror applies overrides and rotation",
        override_ok,
        format!("helper = {helper:?}"),
    ));

    results
}

// ── 3. Layout manifest ──────────────────────────────────────────────────

fn validate_layout_manifest() -> Vec<TestResult> {
    let mut results = Vec::new();

    let layout: LayoutSpec = match serde_json::from_str(LAYOUT_JSON) {
        Ok(l) => l,
        Err(e) => {
            results.push(check("layout manifest parses", false, e.to_string()));
            return results;
        }
    };
    results.push(check(
        "layout manifest parses",
        true,
        format!("{} structures", layout.structures.len()),
    ));

    let mut engine = StationEngine::new(layout.grid.width, layout.grid.height);
    let mut placed = 0usize;
    let mut expected_helpers = 0usize;
    for def in &layout.structures {
        if engine.place_structure(def.spec()).is_some() {
            placed += 1;
            if let Some(kind) = def.door {
                expected_helpers += kind.additional_tiles().len();
            }
        }
    }
    results.push(check(
        "all manifest structures place",
        placed == layout.structures.len(),
        format!("{placed}/{} placed", layout.structures.len()),
    ));
    results.push(check(
        "manifest helper count",
        engine.helper_count() == expected_helpers,
        format!("{} helpers, expected {expected_helpers}", engine.helper_count()),
    ));
    results.push(check(
        "grid index consistent after placement",
        engine.grid.check_consistency(&engine.world).is_empty(),
        "every indexed entity alive and on its tile",
    ));

    results
}

// ── 4. Airlock lifecycle ────────────────────────────────────────────────

fn validate_airlock_lifecycle() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = StationEngine::new(16, 16);

    let airlock = match engine.place_structure(
        StructureSpec::new("Lifecycle Airlock", TileVec::new(4, 4)).door(DoorKind::Triple),
    ) {
        Some(e) => e,
        None => {
            results.push(check("triple airlock places", false, "placement failed"));
            return results;
        }
    };
    let span = [TileVec::new(4, 4), TileVec::new(5, 4), TileVec::new(6, 4)];

    results.push(check(
        "triple airlock places",
        engine.helpers_of(airlock).len() == 2,
        format!("{} helpers", engine.helpers_of(airlock).len()),
    ));
    results.push(check(
        "closed airlock seals its span",
        span.iter().all(|&t| engine.tile_sealed(t)),
        "3/3 tiles sealed",
    ));

    engine.set_door_open(airlock, true);
    results.push(check(
        "open airlock unseals its span",
        span.iter().all(|&t| !engine.tile_sealed(t)),
        "3/3 tiles passable",
    ));

    engine.set_door_open(airlock, false);
    let dirty = engine.drain_dirty_tiles();
    results.push(check(
        "dirty tiles cover the span",
        span.iter().all(|t| dirty.contains(t)),
        format!("{} dirty tiles", dirty.len()),
    ));

    results
}

// ── 5. Destruction cascade ──────────────────────────────────────────────

fn validate_cascade() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = StationEngine::new(16, 16);

    let airlock = engine
        .place_structure(
            StructureSpec::new("Doomed Airlock", TileVec::new(4, 4)).door(DoorKind::Triple),
        )
        .expect("in-bounds placement");
    let helpers = engine.helpers_of(airlock);

    engine.queue(Command::Destroy(airlock));
    engine.tick(1.0 / 60.0);

    results.push(check(
        "cascade destroys every helper",
        helpers.iter().all(|&h| !engine.entity_exists(h)),
        format!("{} helpers gone", helpers.len()),
    ));
    results.push(check(
        "cascade clears the tile index",
        engine.airtight_at(TileVec::new(5, 4)).is_empty()
            && engine.airtight_at(TileVec::new(6, 4)).is_empty(),
        "no orphan markers on former span",
    ));

    results
}

// ── 6. Partial coverage ─────────────────────────────────────────────────

fn validate_partial_coverage() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = StationEngine::new(8, 8);

    // Triple airlock with its anchor one tile from the edge: one extra tile
    // resolves, the other falls off the grid.
    let airlock = engine
        .place_structure(
            StructureSpec::new("Edge Airlock", TileVec::new(6, 4)).door(DoorKind::Triple),
        )
        .expect("anchor tile is in bounds");

    results.push(check(
        "edge airlock keeps partial coverage",
        engine.helpers_of(airlock).len() == 1,
        format!("{} of 2 helpers", engine.helpers_of(airlock).len()),
    ));

    engine.set_air_blocked(airlock, false);
    let still_mirrors = engine
        .airtight_at(TileVec::new(7, 4))
        .first()
        .map(|(_, marker)| !marker.air_blocked)
        .unwrap_or(false);
    results.push(check(
        "surviving helper still mirrors",
        still_mirrors,
        "remaining helper followed unblock",
    ));

    results
}

// ── 7. Power failure ────────────────────────────────────────────────────

fn validate_power_failure() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = StationEngine::new(16, 16);

    let airlock = engine
        .place_structure(
            StructureSpec::new("Powered Airlock", TileVec::new(4, 4)).door(DoorKind::Wide),
        )
        .expect("in-bounds placement");

    engine.queue(Command::SetPower(false));
    engine.tick(1.0 / 60.0);

    let span_open = !engine.tile_sealed(TileVec::new(4, 4)) && !engine.tile_sealed(TileVec::new(5, 4));
    results.push(check(
        "power loss fails the airlock open",
        span_open,
        "both tiles passable after outage",
    ));
    let _ = airlock;

    results
}

// ── 8. Persistence ──────────────────────────────────────────────────────

fn validate_persistence() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = StationEngine::new(24, 16);
    engine.generate(&StationConfig::default());

    let structures = engine.structure_count();
    let helpers = engine.helper_count();

    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        results.push(check("station saves", false, e.to_string()));
        return results;
    }
    results.push(check(
        "station saves",
        true,
        format!("{} bytes", buffer.len()),
    ));

    let mut loaded = StationEngine::new(1, 1);
    match loaded.load(&buffer[..]) {
        Ok(()) => {
            results.push(check(
                "roundtrip preserves structures",
                loaded.structure_count() == structures,
                format!("{} structures", loaded.structure_count()),
            ));
            results.push(check(
                "helpers re-resolve on load",
                loaded.helper_count() == helpers,
                format!("{} helpers (none were serialized)", loaded.helper_count()),
            ));
        }
        Err(e) => results.push(check("station loads", false, e.to_string())),
    }

    results
}

// ── 9. Generated station ────────────────────────────────────────────────

fn validate_generation() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = StationEngine::new(24, 16);
    let layout = engine.generate(&StationConfig::default());

    results.push(check(
        "generation places airlocks",
        !layout.airlocks.is_empty(),
        format!("{} airlocks on the bulkhead", layout.airlocks.len()),
    ));

    let mut sealed = 0;
    let mut total = 0;
    for y in 1..engine.grid.height() - 1 {
        total += 1;
        if engine.tile_sealed(TileVec::new(layout.bulkhead_x, y)) {
            sealed += 1;
        }
    }
    results.push(check(
        "bulkhead column fully sealed",
        sealed == total,
        format!("{sealed}/{total} tiles sealed"),
    ));

    // Every airlock descriptor is live and fully resolved.
    let all_active = layout.airlocks.iter().all(|&airlock| {
        engine
            .world
            .get::<&MultiTileAirtight>(airlock)
            .map(|m| m.is_active() && m.helpers.len() == m.additional_tiles.len())
            .unwrap_or(false)
    });
    results.push(check(
        "airlock descriptors fully resolved",
        all_active,
        "helper count matches offsets for every airlock",
    ));

    results
}
