//! Core domain types for PathMem.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The puzzle engine, the settlement pipeline and the host binary all speak in these types.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod bridge;
mod grid;
mod outcome;
mod profile;

pub use bridge::{BridgeDecodeError, BridgeMessage, RESULT_MESSAGE_TYPE};
pub use grid::{Grid, GridCell, Path, PathError};
pub use outcome::SessionOutcome;
pub use profile::{PlayerProfile, SPAWN_HEALTH};
