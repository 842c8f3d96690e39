//! Component definitions for the station simulation.
//!
//! Components are pure data structures attached to entities.
//! Systems (in the `systems` module) contain the logic that operates on them.

pub mod airtight;
pub mod structure;

pub use airtight::*;
pub use structure::*;
