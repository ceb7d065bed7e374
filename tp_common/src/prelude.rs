//! Prelude module for common re-exports.
//!
//! ```rust
//! use tp_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Cell ───────────────────────────────────────────────────────────
pub use crate::cell::config::CellConfig;
pub use crate::cell::error::CellError;
pub use crate::cell::types::{
    CarouselSnapshot, CellSnapshot, GripperSnapshot, PackagingSnapshot, Puck, PuckColor,
    SortingSnapshot, StartSnapshot, StationId,
};

// ─── Sensors ────────────────────────────────────────────────────────
pub use crate::consts::{
    SENSOR_GRIPPER_AT_CAROUSEL, SENSOR_GRIPPER_AT_PACKAGING, SENSOR_GRIPPER_AT_SORTING,
    SENSOR_GRIPPER_AT_START,
};
