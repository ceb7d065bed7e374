//! Start buffer.

use super::PuckSlot;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{Puck, StartSnapshot};

/// Single-slot buffer where new pucks enter the cell.
#[derive(Debug, Default)]
pub struct Start {
    slot: Option<Puck>,
}

impl Start {
    /// Create an empty start station.
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned copy of the station state.
    pub fn snapshot(&self) -> StartSnapshot {
        StartSnapshot { puck_slot: self.slot }
    }
}

impl PuckSlot for Start {
    fn place(&mut self, puck: Puck) -> Result<(), CellError> {
        if self.slot.is_some() {
            return Err(CellError::SlotOccupied);
        }
        self.slot = Some(puck);
        Ok(())
    }

    fn take(&mut self) -> Result<Puck, CellError> {
        self.slot.take().ok_or(CellError::SlotEmpty)
    }

    fn restore(&mut self, puck: Puck) {
        self.slot = Some(puck);
    }
}
