//! Puck, station and snapshot types.
//!
//! Snapshots are owned copies of live simulation state taken under the
//! cell lock. They serialize with camelCase field names, the shape the
//! visualisation poller reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Workpiece colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuckColor {
    /// Red workpiece.
    Red,
    /// Silver (metallic) workpiece.
    Silver,
    /// Black workpiece.
    Black,
}

impl PuckColor {
    /// Every colour the start station can produce.
    pub const ALL: [PuckColor; 3] = [PuckColor::Red, PuckColor::Silver, PuckColor::Black];

    /// Lowercase colour name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PuckColor::Red => "red",
            PuckColor::Silver => "silver",
            PuckColor::Black => "black",
        }
    }
}

impl fmt::Display for PuckColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workpiece transported through the cell.
///
/// Only the packaging line flips `is_packaged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puck {
    /// Colour, fixed at creation.
    pub color: PuckColor,
    /// Set once the packaging cycle completes.
    pub is_packaged: bool,
}

impl Puck {
    /// Create a raw (unpackaged) puck.
    pub fn new(color: PuckColor) -> Self {
        Self {
            color,
            is_packaged: false,
        }
    }
}

/// Puck-holding stations of the cell, in rail order from left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationId {
    /// Rotating carousel with inspection and drilling positions.
    Carousel,
    /// Start buffer where new pucks appear.
    Start,
    /// Packaging line.
    Packaging,
    /// Sorting line with the colour-indexed output ledger.
    Sorting,
}

impl StationId {
    /// All stations in rail order.
    pub const ALL: [StationId; 4] = [
        StationId::Carousel,
        StationId::Start,
        StationId::Packaging,
        StationId::Sorting,
    ];

    /// Lowercase station name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StationId::Carousel => "carousel",
            StationId::Start => "start",
            StationId::Packaging => "packaging",
            StationId::Sorting => "sorting",
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gripper state as seen by a visualisation poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GripperSnapshot {
    /// Claw open flag.
    pub is_open: bool,
    /// Held puck, if any.
    pub puck_slot: Option<Puck>,
    /// Horizontal rail position (m).
    pub cur_horizontal_position: f64,
    /// Vertical lift position (m).
    pub cur_vertical_position: f64,
    /// A horizontal motion task is running.
    pub is_moving_horizontally: bool,
    /// A vertical motion task is running.
    pub is_moving_vertically: bool,
    /// Moves are rejected until motion is re-enabled.
    pub stop_requested: bool,
}

impl GripperSnapshot {
    /// True while either axis is moving.
    pub fn is_moving(&self) -> bool {
        self.is_moving_horizontally || self.is_moving_vertically
    }
}

/// Start station state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSnapshot {
    /// Waiting puck, if any.
    pub puck_slot: Option<Puck>,
}

/// Carousel state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSnapshot {
    /// Slots, index 0 faces the gripper.
    pub slots: Vec<Option<Puck>>,
    /// A rotation is in progress.
    pub rotating: bool,
}

/// Packaging line state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingSnapshot {
    /// Puck on the line, if any.
    pub puck_slot: Option<Puck>,
    /// A packaging cycle is in progress.
    pub processing: bool,
}

/// Sorting line state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortingSnapshot {
    /// Puck on the line, if any.
    pub puck_slot: Option<Puck>,
    /// A sorting cycle is in progress.
    pub processing: bool,
    /// Sorted pucks per colour, in arrival order.
    pub produced: BTreeMap<PuckColor, Vec<Puck>>,
}

/// Whole-cell snapshot, taken atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    /// Gripper state.
    pub gripper: GripperSnapshot,
    /// Start station state.
    pub start: StartSnapshot,
    /// Carousel state.
    pub carousel: CarouselSnapshot,
    /// Packaging line state.
    pub packaging: PackagingSnapshot,
    /// Sorting line state.
    pub sorting: SortingSnapshot,
    /// Sensor id to value.
    pub sensors: BTreeMap<String, bool>,
}
