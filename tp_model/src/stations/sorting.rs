//! Sorting line with the colour-indexed output ledger.

use super::PuckSlot;
use std::collections::BTreeMap;
use std::time::Duration;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{Puck, PuckColor, SortingSnapshot, StationId};

/// Single-slot sorting line. Sorted pucks leave the slot for the ledger.
#[derive(Debug)]
pub struct SortingLine {
    slot: Option<Puck>,
    /// Sorting cycle in progress
    processing: bool,
    /// Append-only, per colour in arrival order
    produced: BTreeMap<PuckColor, Vec<Puck>>,
    cycle_time: Duration,
}

impl SortingLine {
    /// Create an empty sorting line with an empty ledger.
    pub fn new(cycle_time: Duration) -> Self {
        Self {
            slot: None,
            processing: false,
            produced: BTreeMap::new(),
            cycle_time,
        }
    }

    /// Start a sorting cycle on the held puck. Returns the cycle duration.
    ///
    /// # Errors
    /// `StationBusy` during a cycle, `SlotEmpty`.
    pub fn begin_sorting(&mut self) -> Result<Duration, CellError> {
        if self.processing {
            return Err(CellError::StationBusy(StationId::Sorting));
        }
        if self.slot.is_none() {
            return Err(CellError::SlotEmpty);
        }
        self.processing = true;
        Ok(self.cycle_time)
    }

    /// Complete the cycle: move the held puck into the ledger.
    pub fn finish_sorting(&mut self) -> Option<Puck> {
        self.processing = false;
        let puck = self.slot.take()?;
        self.produced.entry(puck.color).or_default().push(puck);
        Some(puck)
    }

    /// Sorted pucks of one colour, in arrival order.
    pub fn produced(&self, color: PuckColor) -> &[Puck] {
        self.produced.get(&color).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Owned copy of the line state, ledger included.
    pub fn snapshot(&self) -> SortingSnapshot {
        SortingSnapshot {
            puck_slot: self.slot,
            processing: self.processing,
            produced: self.produced.clone(),
        }
    }
}

impl PuckSlot for SortingLine {
    fn place(&mut self, puck: Puck) -> Result<(), CellError> {
        if self.slot.is_some() {
            return Err(CellError::SlotOccupied);
        }
        if !puck.is_packaged {
            return Err(CellError::NotYetPackaged);
        }
        self.slot = Some(puck);
        Ok(())
    }

    fn take(&mut self) -> Result<Puck, CellError> {
        if self.processing {
            return Err(CellError::StationBusy(StationId::Sorting));
        }
        self.slot.take().ok_or(CellError::SlotEmpty)
    }

    fn restore(&mut self, puck: Puck) {
        self.slot = Some(puck);
    }
}
