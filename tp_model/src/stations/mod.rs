//! Station slot machines.
//!
//! Every station holds at most one puck per slot and implements [`PuckSlot`]:
//! a puck can be placed in or taken out, each failing when the station's
//! precondition is violated.
//!
//! - [`start`] - Start buffer, plain single slot
//! - [`carousel`] - Rotating slot ring with inspection and drilling positions
//! - [`packaging`] - Single slot with a timed packaging cycle
//! - [`sorting`] - Single slot with a timed sorting cycle and output ledger
//!
//! Timed operations are split into `begin_*` (validate, mark busy) and
//! `finish_*` (commit) so the caller can wait without holding the cell lock.

pub mod carousel;
pub mod packaging;
pub mod sorting;
pub mod start;

pub use carousel::Carousel;
pub use packaging::PackagingLine;
pub use sorting::SortingLine;
pub use start::Start;

use tp_common::cell::error::CellError;
use tp_common::cell::types::Puck;

/// Hand-off contract shared by every station.
pub trait PuckSlot {
    /// Put a puck into the station's hand-off slot.
    fn place(&mut self, puck: Puck) -> Result<(), CellError>;

    /// Remove the puck from the station's hand-off slot.
    fn take(&mut self) -> Result<Puck, CellError>;

    /// Put back a puck just returned by [`PuckSlot::take`].
    ///
    /// Compensation path of a failed hand-off: acceptance rules are skipped
    /// because the puck is returning to the slot it left.
    fn restore(&mut self, puck: Puck);
}
