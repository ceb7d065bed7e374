//! # TP Model Library
//!
//! Software twin of the gripper production cell: a gripper on a horizontal
//! rail with a vertical lift, carrying pucks between four stations.
//!
//! # Module Structure
//!
//! - [`gripper`] - Two-axis motion model, claw and cooperative stop
//! - [`stations`] - Start, Carousel, PackagingLine and SortingLine slot machines
//! - [`routing`] - Rail position to station lookup
//! - [`sensors`] - Position sensors derived from the rail position
//! - [`service`] - Orchestrator owning the whole cell state
//! - [`scenario`] - Scripted driver with bounded waits
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         Service (handle)                       │
//! │  ┌──────────────────────── Mutex<CellState> ────────────────┐  │
//! │  │  Gripper   Start   Carousel   PackagingLine  SortingLine │  │
//! │  │  SensorBank                                              │  │
//! │  └──────────▲───────────────▲────────────────▲──────────────┘  │
//! │             │               │                │                 │
//! │      motion task       sensor loop      timed jobs             │
//! │   (per move, StopToken) (every tick)  (rotate/pack/sort)       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod gripper;
pub mod routing;
pub mod scenario;
pub mod sensors;
pub mod service;
pub mod stations;

pub use crate::gripper::{Direction, StopToken};
pub use crate::scenario::{Driver, DriverConfig};
pub use crate::service::Service;
