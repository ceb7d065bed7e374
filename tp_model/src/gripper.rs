//! Gripper motion model.
//!
//! The gripper owns a continuous horizontal (rail) and vertical (lift)
//! position, a claw flag and an optional held puck. Motion is a constant
//! velocity kinematic approximation: each tick advances the active axis by
//! `speed / tick_rate` toward its bound and clamps there.
//!
//! The stepping itself is driven by a motion task (see `service`), which
//! receives a [`StopToken`] when it is spawned and polls it once per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tp_common::cell::config::CellConfig;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{GripperSnapshot, Puck};
use tracing::{debug, trace};

/// Gripper axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Rail, carousel side to sorting side.
    Horizontal,
    /// Lift, down to up.
    Vertical,
}

/// Requested motion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the carousel.
    Left,
    /// Toward the sorting line.
    Right,
    /// Raise.
    Up,
    /// Lower.
    Down,
}

impl Direction {
    /// Axis moved by this direction.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }
}

/// Cancellation token handed to one motion task.
///
/// Once cancelled it stays cancelled; re-enabling motion arms a fresh token
/// for the next move instead of reviving this one.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Create an armed token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the holder to stop at its next poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Travel limits of both axes.
#[derive(Debug, Clone, Copy)]
struct Limits {
    left: f64,
    right: f64,
    down: f64,
    up: f64,
}

/// Gripper state.
pub struct Gripper {
    /// Claw open flag
    is_open: bool,
    /// Held puck
    puck: Option<Puck>,
    /// Rail position (m)
    horizontal: f64,
    /// Lift position (m)
    vertical: f64,
    /// Horizontal motion task running
    moving_horizontally: bool,
    /// Vertical motion task running
    moving_vertically: bool,
    /// Moves rejected until `enable_moving`
    stop_requested: bool,
    /// Token of the running motion task
    active: Option<StopToken>,
    limits: Limits,
    horizontal_step: f64,
    vertical_step: f64,
}

impl Gripper {
    /// Create a gripper parked above the start station: closed, empty, raised.
    pub fn new(config: &CellConfig) -> Self {
        Self {
            is_open: false,
            puck: None,
            horizontal: config.start_position,
            vertical: config.up_position,
            moving_horizontally: false,
            moving_vertically: false,
            stop_requested: false,
            active: None,
            limits: Limits {
                left: config.carousel_position,
                right: config.sorting_position,
                down: config.down_position,
                up: config.up_position,
            },
            horizontal_step: config.horizontal_step(),
            vertical_step: config.vertical_step(),
        }
    }

    /// True while either axis is moving.
    pub fn is_moving(&self) -> bool {
        self.moving_horizontally || self.moving_vertically
    }

    /// Validate a move request and mark the axis as moving.
    ///
    /// Returns the token the motion task must poll every tick.
    ///
    /// # Errors
    /// - `AlreadyMoving` if either axis is moving
    /// - `StopRequested` if stop was requested and motion not re-enabled
    pub fn begin_move(&mut self, direction: Direction) -> Result<StopToken, CellError> {
        if self.is_moving() {
            return Err(CellError::AlreadyMoving);
        }
        if self.stop_requested {
            return Err(CellError::StopRequested);
        }

        match direction.axis() {
            Axis::Horizontal => self.moving_horizontally = true,
            Axis::Vertical => self.moving_vertically = true,
        }
        let token = StopToken::new();
        self.active = Some(token.clone());
        debug!(
            "Gripper move {:?} from x={:.4}, y={:.4}",
            direction, self.horizontal, self.vertical
        );
        Ok(token)
    }

    /// Advance one tick toward the bound of `direction`.
    ///
    /// Returns `true` once the bound is reached.
    pub fn step(&mut self, direction: Direction) -> bool {
        let limits = self.limits;
        let reached = match direction {
            Direction::Left => {
                self.horizontal = (self.horizontal - self.horizontal_step).max(limits.left);
                self.horizontal <= limits.left
            }
            Direction::Right => {
                self.horizontal = (self.horizontal + self.horizontal_step).min(limits.right);
                self.horizontal >= limits.right
            }
            Direction::Up => {
                self.vertical = (self.vertical + self.vertical_step).min(limits.up);
                self.vertical >= limits.up
            }
            Direction::Down => {
                self.vertical = (self.vertical - self.vertical_step).max(limits.down);
                self.vertical <= limits.down
            }
        };
        trace!(
            "Gripper step {:?}: x={:.4}, y={:.4}",
            direction, self.horizontal, self.vertical
        );
        reached
    }

    /// Clear the motion flag of `direction`'s axis. Called by the motion task on exit.
    pub fn finish_move(&mut self, direction: Direction) {
        match direction.axis() {
            Axis::Horizontal => self.moving_horizontally = false,
            Axis::Vertical => self.moving_vertically = false,
        }
        self.active = None;
        debug!(
            "Gripper stopped {:?} at x={:.4}, y={:.4}",
            direction, self.horizontal, self.vertical
        );
    }

    /// Request a soft stop.
    ///
    /// Does not clear the motion flag; the running task does that when it
    /// observes the cancelled token, at most one tick later.
    pub fn stop(&mut self) {
        self.stop_requested = true;
        if let Some(token) = &self.active {
            token.cancel();
        }
    }

    /// Accept move requests again after a stop. Idempotent.
    pub fn enable_moving(&mut self) {
        self.stop_requested = false;
    }

    /// Open the claw.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Close the claw.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Grab a puck.
    ///
    /// # Errors
    /// `AlreadyMoving`, `SlotOccupied` if already holding, `NotOpen` if closed.
    pub fn take_in(&mut self, puck: Puck) -> Result<(), CellError> {
        if self.is_moving() {
            return Err(CellError::AlreadyMoving);
        }
        if self.puck.is_some() {
            return Err(CellError::SlotOccupied);
        }
        if !self.is_open {
            return Err(CellError::NotOpen);
        }
        self.puck = Some(puck);
        Ok(())
    }

    /// Let go of the held puck.
    ///
    /// # Errors
    /// `AlreadyMoving`, `SlotEmpty` if not holding, `NotOpen` if closed.
    pub fn release_out(&mut self) -> Result<Puck, CellError> {
        if self.is_moving() {
            return Err(CellError::AlreadyMoving);
        }
        if self.puck.is_none() {
            return Err(CellError::SlotEmpty);
        }
        if !self.is_open {
            return Err(CellError::NotOpen);
        }
        self.puck.take().ok_or(CellError::SlotEmpty)
    }

    /// Put back a puck that was released moments ago under the same lock.
    pub(crate) fn restore(&mut self, puck: Puck) {
        self.puck = Some(puck);
    }

    /// Held puck, if any.
    pub fn puck(&self) -> Option<&Puck> {
        self.puck.as_ref()
    }

    /// Whether a puck is held.
    pub fn holds_puck(&self) -> bool {
        self.puck.is_some()
    }

    /// Claw open flag.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Rail position (m).
    pub fn horizontal(&self) -> f64 {
        self.horizontal
    }

    /// Lift position (m).
    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    /// Whether the lift is at (or below) its lowered bound.
    pub fn is_down(&self) -> bool {
        self.vertical <= self.limits.down
    }

    /// Whether a stop is pending.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Owned copy of the gripper state.
    pub fn snapshot(&self) -> GripperSnapshot {
        GripperSnapshot {
            is_open: self.is_open,
            puck_slot: self.puck,
            cur_horizontal_position: self.horizontal,
            cur_vertical_position: self.vertical,
            is_moving_horizontally: self.moving_horizontally,
            is_moving_vertically: self.moving_vertically,
            stop_requested: self.stop_requested,
        }
    }
}
