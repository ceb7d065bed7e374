//! Geometry and timing of the simulated cell.
//!
//! # TOML Example
//!
//! ```toml
//! [cell]
//! tick_rate_hz = 100
//! horizontal_speed = 0.1
//! packaging_time_ms = 1000
//! ```

use crate::cell::types::StationId;
use crate::config::ConfigError;
use crate::consts::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cell configuration. Every field has a default matching the physical cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellConfig {
    /// Motion and sensor ticks per second.
    pub tick_rate_hz: u32,
    /// Rail speed (m/s).
    pub horizontal_speed: f64,
    /// Lift speed (m/s).
    pub vertical_speed: f64,
    /// Raised vertical bound (m).
    pub up_position: f64,
    /// Lowered vertical bound (m).
    pub down_position: f64,
    /// Carousel coordinate, left rail bound (m).
    pub carousel_position: f64,
    /// Start station coordinate (m).
    pub start_position: f64,
    /// Packaging line coordinate (m).
    pub packaging_position: f64,
    /// Sorting line coordinate, right rail bound (m).
    pub sorting_position: f64,
    /// Station match radius (m).
    pub position_tolerance: f64,
    /// Number of carousel slots.
    pub carousel_slots: usize,
    /// Carousel inspection slot index.
    pub inspect_slot: usize,
    /// Carousel drilling slot index.
    pub drill_slot: usize,
    /// One-slot carousel rotation time.
    pub rotation_time_ms: u64,
    /// Packaging cycle time.
    pub packaging_time_ms: u64,
    /// Sorting cycle time.
    pub sorting_time_ms: u64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: TICK_RATE_HZ,
            horizontal_speed: GRIPPER_HORIZONTAL_SPEED,
            vertical_speed: GRIPPER_VERTICAL_SPEED,
            up_position: GRIPPER_UP_POS,
            down_position: GRIPPER_DOWN_POS,
            carousel_position: GRIPPER_CAROUSEL_POS,
            start_position: GRIPPER_START_POS,
            packaging_position: GRIPPER_PACKAGING_POS,
            sorting_position: GRIPPER_SORTING_POS,
            position_tolerance: GRIPPER_POSITION_TOLERANCE,
            carousel_slots: CAROUSEL_TOTAL_SLOTS,
            inspect_slot: CAROUSEL_INSPECT_SLOT,
            drill_slot: CAROUSEL_DRILL_SLOT,
            rotation_time_ms: CAROUSEL_ROTATION_TIME_MS,
            packaging_time_ms: PACKAGING_TIME_MS,
            sorting_time_ms: SORTING_TIME_MS,
        }
    }
}

impl CellConfig {
    /// Tick rate clamped to `1..=MAX_TICK_RATE_HZ`.
    pub fn effective_tick_rate(&self) -> u32 {
        self.tick_rate_hz.clamp(1, MAX_TICK_RATE_HZ)
    }

    /// Period of one simulation tick. Never zero.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.effective_tick_rate()
    }

    /// Rail distance covered per tick.
    pub fn horizontal_step(&self) -> f64 {
        self.horizontal_speed / f64::from(self.effective_tick_rate())
    }

    /// Lift distance covered per tick.
    pub fn vertical_step(&self) -> f64 {
        self.vertical_speed / f64::from(self.effective_tick_rate())
    }

    /// Carousel one-slot rotation time.
    pub fn rotation_time(&self) -> Duration {
        Duration::from_millis(self.rotation_time_ms)
    }

    /// Packaging cycle time.
    pub fn packaging_time(&self) -> Duration {
        Duration::from_millis(self.packaging_time_ms)
    }

    /// Sorting cycle time.
    pub fn sorting_time(&self) -> Duration {
        Duration::from_millis(self.sorting_time_ms)
    }

    /// Nominal rail coordinate of a station.
    pub fn station_position(&self, station: StationId) -> f64 {
        match station {
            StationId::Carousel => self.carousel_position,
            StationId::Start => self.start_position,
            StationId::Packaging => self.packaging_position,
            StationId::Sorting => self.sorting_position,
        }
    }

    /// Validate the configuration.
    ///
    /// Carousel inspect/drill indices are checked when the carousel is built
    /// and reported as `CellError::BadSlotIndex`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > MAX_TICK_RATE_HZ {
            return Err(invalid(&format!(
                "tick_rate_hz must be within 1..={MAX_TICK_RATE_HZ}"
            )));
        }
        if let Some(field) = self.first_non_finite() {
            return Err(invalid(&format!("{field} must be a finite number")));
        }
        if self.horizontal_speed <= 0.0 || self.vertical_speed <= 0.0 {
            return Err(invalid("gripper speeds must be positive"));
        }
        if self.up_position <= self.down_position {
            return Err(invalid("up_position must be above down_position"));
        }
        if self.position_tolerance <= 0.0 {
            return Err(invalid("position_tolerance must be positive"));
        }
        if self.carousel_slots == 0 {
            return Err(invalid("carousel needs at least one slot"));
        }

        for pair in StationId::ALL.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let gap = self.station_position(right) - self.station_position(left);
            if gap <= 0.0 {
                return Err(invalid(&format!(
                    "{right} must lie right of {left} on the rail"
                )));
            }
            if gap < 2.0 * self.position_tolerance {
                return Err(invalid(&format!(
                    "{left} and {right} are closer than twice the position tolerance"
                )));
            }
        }
        Ok(())
    }

    fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("horizontal_speed", self.horizontal_speed),
            ("vertical_speed", self.vertical_speed),
            ("up_position", self.up_position),
            ("down_position", self.down_position),
            ("carousel_position", self.carousel_position),
            ("start_position", self.start_position),
            ("packaging_position", self.packaging_position),
            ("sorting_position", self.sorting_position),
            ("position_tolerance", self.position_tolerance),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(field, _)| field)
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::ValidationError(reason.to_string())
}
