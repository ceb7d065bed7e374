//! Packaging line.

use super::PuckSlot;
use std::time::Duration;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{PackagingSnapshot, Puck, StationId};

/// Single-slot packaging line: accepts raw pucks, yields packaged ones.
#[derive(Debug)]
pub struct PackagingLine {
    slot: Option<Puck>,
    /// Packaging cycle in progress
    processing: bool,
    cycle_time: Duration,
}

impl PackagingLine {
    /// Create an empty packaging line.
    pub fn new(cycle_time: Duration) -> Self {
        Self {
            slot: None,
            processing: false,
            cycle_time,
        }
    }

    /// Start a packaging cycle on the held puck. Returns the cycle duration.
    ///
    /// # Errors
    /// `StationBusy` during a cycle, `SlotEmpty`, `PuckAlreadyPackaged`.
    pub fn begin_packaging(&mut self) -> Result<Duration, CellError> {
        if self.processing {
            return Err(CellError::StationBusy(StationId::Packaging));
        }
        let puck = self.slot.as_ref().ok_or(CellError::SlotEmpty)?;
        if puck.is_packaged {
            return Err(CellError::PuckAlreadyPackaged);
        }
        self.processing = true;
        Ok(self.cycle_time)
    }

    /// Complete the cycle: the held puck becomes packaged.
    pub fn finish_packaging(&mut self) -> Option<Puck> {
        self.processing = false;
        if let Some(puck) = self.slot.as_mut() {
            puck.is_packaged = true;
        }
        self.slot
    }

    /// Owned copy of the line state.
    pub fn snapshot(&self) -> PackagingSnapshot {
        PackagingSnapshot {
            puck_slot: self.slot,
            processing: self.processing,
        }
    }
}

impl PuckSlot for PackagingLine {
    fn place(&mut self, puck: Puck) -> Result<(), CellError> {
        if self.slot.is_some() {
            return Err(CellError::SlotOccupied);
        }
        if puck.is_packaged {
            return Err(CellError::PuckAlreadyPackaged);
        }
        self.slot = Some(puck);
        Ok(())
    }

    fn take(&mut self) -> Result<Puck, CellError> {
        if self.processing {
            return Err(CellError::StationBusy(StationId::Packaging));
        }
        match self.slot {
            None => Err(CellError::SlotEmpty),
            Some(puck) if !puck.is_packaged => Err(CellError::NotYetPackaged),
            Some(_) => self.slot.take().ok_or(CellError::SlotEmpty),
        }
    }

    fn restore(&mut self, puck: Puck) {
        self.slot = Some(puck);
    }
}
