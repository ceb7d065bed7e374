//! Cell operation error taxonomy.
//!
//! Every error is local and recoverable: an operation that fails leaves the
//! shared state as it was (hand-off failures restore the puck to where it came
//! from). The caller decides whether to retry.

use crate::cell::types::StationId;
use std::time::Duration;
use thiserror::Error;

/// Error types for cell operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    /// A move was requested while an axis is already moving
    #[error("gripper is moving already")]
    AlreadyMoving,

    /// A move was requested after a stop without re-enabling motion
    #[error("gripper stop requested, enable moving first")]
    StopRequested,

    /// The gripper claw must be open to exchange a puck
    #[error("gripper is closed, need to open it to exchange a puck")]
    NotOpen,

    /// Target slot already holds a puck
    #[error("this slot is busy")]
    SlotOccupied,

    /// Source slot holds no puck
    #[error("this slot is empty")]
    SlotEmpty,

    /// Station only accepts raw pucks
    #[error("puck is packaged")]
    PuckAlreadyPackaged,

    /// Station only accepts or yields packaged pucks
    #[error("puck is not packaged yet")]
    NotYetPackaged,

    /// Gripper is not within tolerance of any station
    #[error("no station matched gripper position {position:.4} m")]
    NoStationAtPosition {
        /// Horizontal position at the time of the hand-off
        position: f64,
    },

    /// Hand-off requested in a state where it makes no physical sense
    #[error("invalid hand-off: {0}")]
    InvalidHandoff(String),

    /// Unknown sensor identifier
    #[error("sensor not found: {0}")]
    SensorNotFound(String),

    /// Configured carousel slot index outside the carousel
    #[error("bad slot index {index} for carousel with {slots} slots")]
    BadSlotIndex {
        /// Offending index
        index: usize,
        /// Carousel size
        slots: usize,
    },

    /// Station is in the middle of a timed operation
    #[error("{0} is busy")]
    StationBusy(StationId),

    /// Bounded wait expired
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout {
        /// What was awaited
        what: String,
        /// Wait budget that elapsed
        after: Duration,
    },

    /// A scheduled timed job did not run to completion
    #[error("simulation job aborted: {0}")]
    JobAborted(String),
}

impl CellError {
    /// Shorthand for [`CellError::InvalidHandoff`].
    pub fn invalid_handoff(reason: impl Into<String>) -> Self {
        CellError::InvalidHandoff(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = CellError::NoStationAtPosition { position: 0.3 };
        assert_eq!(err.to_string(), "no station matched gripper position 0.3000 m");

        let err = CellError::BadSlotIndex { index: 7, slots: 6 };
        assert!(err.to_string().contains("7"));

        let err = CellError::StationBusy(StationId::Carousel);
        assert_eq!(err.to_string(), "carousel is busy");
    }

    #[test]
    fn test_invalid_handoff_helper() {
        assert_eq!(
            CellError::invalid_handoff("cannot release while raised"),
            CellError::InvalidHandoff("cannot release while raised".to_string())
        );
    }
}
