//! TP Common Library
//!
//! This crate provides the shared value types, error taxonomy and
//! configuration loading utilities for all TP workspace crates.
//!
//! # Module Structure
//!
//! - [`cell`] - Production cell types: pucks, stations, snapshots, errors, geometry
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Cell geometry defaults and sensor identifiers
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use tp_common::prelude::*;
//!
//! let puck = Puck::new(PuckColor::Red);
//! assert!(!puck.is_packaged);
//! ```

pub mod cell;
pub mod config;
pub mod consts;
pub mod prelude;
