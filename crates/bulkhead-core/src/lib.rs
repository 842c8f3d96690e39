//! Bulkhead Core - Station Airtight Simulation Layer
//!
//! An ECS-based simulation core for a tile-grid space station, centered on
//! the bookkeeping that lets multi-tile structures (wide and triple
//! airlocks, long bulkhead doors) participate in a per-tile atmosphere
//! model that otherwise only understands single-tile blockers.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Walls, doors, airtight seal helpers
//! - **Components**: Pure data attached to entities (Placement, AirtightState, Door, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! A structure that spans several tiles owns one lightweight helper entity
//! per extra tile. Helpers carry their own airtight marker, are kept in
//! lock-step with their owner's marker, and are destroyed with it.
//!
//! # Example
//!
//! ```rust,no_run
//! use bulkhead_core::prelude::*;
//! use bulkhead_core::engine::StructureSpec;
//! use bulkhead_logic::tiles::TileVec;
//!
//! let mut engine = StationEngine::new(32, 32);
//!
//! // Place a wide airlock; a seal helper appears on its second tile.
//! let airlock = engine
//!     .place_structure(
//!         StructureSpec::new("Cargo Airlock", TileVec::new(4, 4)).door(DoorKind::Wide),
//!     )
//!     .unwrap();
//!
//! // Opening the door unseals every tile it spans.
//! engine.set_door_open(airlock, true);
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod grid;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::StationEngine;
    pub use crate::grid::StationGrid;
}
