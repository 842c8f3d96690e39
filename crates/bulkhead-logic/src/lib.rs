//! Pure simulation logic for Bulkhead.
//!
//! This crate contains the tile math and airtight-marker rules that are
//! independent of any database, engine, or runtime. Functions take plain
//! data and return results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`tiles`] | Integer tile coordinates and quarter-turn orientations |
//! | [`airtight`] | Airtight marker record, overrides, direction bitfield, mirror rules |

pub mod airtight;
pub mod tiles;
