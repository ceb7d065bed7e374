//! Production cell domain types.
//!
//! - [`types`] - Pucks, station identifiers and read-only snapshots
//! - [`error`] - `CellError`, the error taxonomy of every cell operation
//! - [`config`] - `CellConfig`, geometry and timing of the simulated cell

pub mod config;
pub mod error;
pub mod types;
