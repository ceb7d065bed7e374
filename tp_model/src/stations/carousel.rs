//! Rotating carousel.
//!
//! Slot 0 faces the gripper. Rotation is a cyclic shift: the content of slot
//! `i` moves to slot `(i + 1) % n`, so after four rotations a puck placed at
//! slot 0 sits under the inspection position (slot 4 by default).

use super::PuckSlot;
use std::time::Duration;
use tp_common::cell::config::CellConfig;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{CarouselSnapshot, Puck, StationId};
use tracing::debug;

/// Carousel slot ring.
#[derive(Debug)]
pub struct Carousel {
    /// Slot contents, index 0 faces the gripper
    slots: Vec<Option<Puck>>,
    /// Index read by `inspect`
    inspect_slot: usize,
    /// Index checked by `drill`
    drill_slot: usize,
    /// Time for one rotation step
    rotation_time: Duration,
    /// Rotation in progress
    rotating: bool,
}

impl Carousel {
    /// Create an empty carousel.
    ///
    /// # Errors
    /// `BadSlotIndex` if the inspect or drill index lies outside the ring.
    pub fn new(
        slots: usize,
        inspect_slot: usize,
        drill_slot: usize,
        rotation_time: Duration,
    ) -> Result<Self, CellError> {
        for index in [inspect_slot, drill_slot] {
            if index >= slots {
                return Err(CellError::BadSlotIndex { index, slots });
            }
        }
        Ok(Self {
            slots: vec![None; slots],
            inspect_slot,
            drill_slot,
            rotation_time,
            rotating: false,
        })
    }

    /// Create a carousel from cell configuration.
    pub fn from_config(config: &CellConfig) -> Result<Self, CellError> {
        Self::new(
            config.carousel_slots,
            config.inspect_slot,
            config.drill_slot,
            config.rotation_time(),
        )
    }

    fn ensure_idle(&self) -> Result<(), CellError> {
        if self.rotating {
            return Err(CellError::StationBusy(StationId::Carousel));
        }
        Ok(())
    }

    /// Read the puck under the inspection position without removing it.
    pub fn inspect(&self) -> Result<Puck, CellError> {
        self.ensure_idle()?;
        self.slots
            .get(self.inspect_slot)
            .ok_or(CellError::BadSlotIndex {
                index: self.inspect_slot,
                slots: self.slots.len(),
            })?
            .ok_or(CellError::SlotEmpty)
    }

    /// Check a puck sits under the drill. State is unchanged; the drill
    /// actuator is outside the model.
    pub fn drill(&self) -> Result<(), CellError> {
        self.ensure_idle()?;
        let slot = self.slots.get(self.drill_slot).ok_or(CellError::BadSlotIndex {
            index: self.drill_slot,
            slots: self.slots.len(),
        })?;
        match slot {
            Some(puck) => {
                debug!("Drilling {} puck at slot {}", puck.color, self.drill_slot);
                Ok(())
            }
            None => Err(CellError::SlotEmpty),
        }
    }

    /// Mark a rotation as started. Returns the rotation duration.
    pub fn begin_rotation(&mut self) -> Result<Duration, CellError> {
        self.ensure_idle()?;
        self.rotating = true;
        Ok(self.rotation_time)
    }

    /// Shift every slot by one position and leave the rotating state.
    pub fn finish_rotation(&mut self) {
        self.slots.rotate_right(1);
        self.rotating = false;
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the ring has no slots. Never true for a constructed carousel.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Owned copy of the carousel state.
    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            slots: self.slots.clone(),
            rotating: self.rotating,
        }
    }
}

impl PuckSlot for Carousel {
    fn place(&mut self, puck: Puck) -> Result<(), CellError> {
        self.ensure_idle()?;
        if self.slots[0].is_some() {
            return Err(CellError::SlotOccupied);
        }
        if puck.is_packaged {
            return Err(CellError::PuckAlreadyPackaged);
        }
        self.slots[0] = Some(puck);
        Ok(())
    }

    fn take(&mut self) -> Result<Puck, CellError> {
        self.ensure_idle()?;
        self.slots[0].take().ok_or(CellError::SlotEmpty)
    }

    fn restore(&mut self, puck: Puck) {
        self.slots[0] = Some(puck);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_common::cell::types::PuckColor;

    fn carousel() -> Carousel {
        Carousel::from_config(&CellConfig::default()).unwrap()
    }

    fn rotate(c: &mut Carousel) {
        c.begin_rotation().unwrap();
        c.finish_rotation();
    }

    #[test]
    fn test_bad_slot_index() {
        let err = Carousel::new(6, 6, 5, Duration::ZERO).unwrap_err();
        assert_eq!(err, CellError::BadSlotIndex { index: 6, slots: 6 });
        let err = Carousel::new(4, 1, 4, Duration::ZERO).unwrap_err();
        assert_eq!(err, CellError::BadSlotIndex { index: 4, slots: 4 });
    }

    #[test]
    fn test_place_rejects_packaged_puck() {
        let mut c = carousel();
        let mut puck = Puck::new(PuckColor::Red);
        puck.is_packaged = true;
        assert_eq!(c.place(puck), Err(CellError::PuckAlreadyPackaged));
        assert_eq!(c.snapshot().slots[0], None);
    }

    #[test]
    fn test_place_and_take_use_slot_zero_only() {
        let mut c = carousel();
        let puck = Puck::new(PuckColor::Silver);
        c.place(puck).unwrap();
        assert_eq!(c.place(Puck::new(PuckColor::Red)), Err(CellError::SlotOccupied));
        rotate(&mut c);
        assert_eq!(c.take(), Err(CellError::SlotEmpty));
        c.place(Puck::new(PuckColor::Black)).unwrap();
        assert_eq!(c.take(), Ok(Puck::new(PuckColor::Black)));
    }

    #[test]
    fn test_rotation_is_cyclic_permutation() {
        let mut c = carousel();
        for color in [PuckColor::Red, PuckColor::Silver, PuckColor::Black] {
            c.place(Puck::new(color)).unwrap();
            rotate(&mut c);
        }
        let before = c.snapshot().slots;
        rotate(&mut c);
        let after = c.snapshot().slots;

        let n = before.len();
        for i in 0..n {
            assert_eq!(after[(i + 1) % n], before[i]);
        }
        let count = |slots: &[Option<Puck>]| slots.iter().flatten().count();
        assert_eq!(count(&before), count(&after));
    }

    #[test]
    fn test_full_turn_returns_to_start() {
        let mut c = carousel();
        let puck = Puck::new(PuckColor::Red);
        c.place(puck).unwrap();
        for _ in 0..c.len() {
            rotate(&mut c);
        }
        assert_eq!(c.take(), Ok(puck));
    }

    #[test]
    fn test_inspect_after_four_rotations() {
        let mut c = carousel();
        assert_eq!(c.inspect(), Err(CellError::SlotEmpty));

        let puck = Puck::new(PuckColor::Black);
        c.place(puck).unwrap();
        for _ in 0..4 {
            rotate(&mut c);
        }
        assert_eq!(c.inspect(), Ok(puck));
        // inspect does not remove
        assert_eq!(c.inspect(), Ok(puck));
        assert_eq!(c.drill(), Err(CellError::SlotEmpty));
        rotate(&mut c);
        assert_eq!(c.drill(), Ok(()));
    }

    #[test]
    fn test_busy_while_rotating() {
        let mut c = carousel();
        c.begin_rotation().unwrap();
        let busy = Err(CellError::StationBusy(StationId::Carousel));
        assert_eq!(c.place(Puck::new(PuckColor::Red)), busy);
        assert_eq!(c.take(), Err(CellError::StationBusy(StationId::Carousel)));
        assert_eq!(c.inspect(), Err(CellError::StationBusy(StationId::Carousel)));
        assert_eq!(c.begin_rotation(), Err(CellError::StationBusy(StationId::Carousel)));
        c.finish_rotation();
        assert!(!c.snapshot().rotating);
    }
}
