//! Cell geometry defaults, timing defaults and sensor identifiers.
//!
//! Lengths are in meters, speeds in meters per second.

/// Canonical service name (used for logging).
pub const TP_SERVICE_NAME: &str = "tp_model";

/// Simulation clock rate (ticks per second).
pub const TICK_RATE_HZ: u32 = 100;

/// Highest accepted simulation clock rate.
pub const MAX_TICK_RATE_HZ: u32 = 10_000;

/// Length of the gripper base.
pub const GRIPPER_BASE_LENGTH: f64 = 0.065;

/// Length of the left end-of-rail sensor.
pub const GRIPPER_LEFT_SENSOR_LENGTH: f64 = 0.02;

/// Length of the right end-of-rail sensor.
pub const GRIPPER_RIGHT_SENSOR_LENGTH: f64 = 0.02;

/// Total horizontal rail length.
pub const GRIPPER_RAIL_LENGTH: f64 = 0.64;

/// Vertical lift speed.
pub const GRIPPER_VERTICAL_SPEED: f64 = 0.1;

/// Fully raised vertical position.
pub const GRIPPER_UP_POS: f64 = 0.09;

/// Fully lowered vertical position.
pub const GRIPPER_DOWN_POS: f64 = 0.0;

/// Horizontal rail speed.
pub const GRIPPER_HORIZONTAL_SPEED: f64 = 0.1;

/// Carousel coordinate, also the left rail bound.
pub const GRIPPER_CAROUSEL_POS: f64 = GRIPPER_LEFT_SENSOR_LENGTH + GRIPPER_BASE_LENGTH / 2.0;

/// Start station coordinate (gripper parks here on power-up).
pub const GRIPPER_START_POS: f64 = 0.2;

/// Packaging line coordinate.
pub const GRIPPER_PACKAGING_POS: f64 = 0.4;

/// Sorting line coordinate, also the right rail bound.
pub const GRIPPER_SORTING_POS: f64 =
    GRIPPER_RAIL_LENGTH - GRIPPER_RIGHT_SENSOR_LENGTH - GRIPPER_BASE_LENGTH / 2.0;

/// Distance from a station coordinate within which the gripper counts as "at" it.
pub const GRIPPER_POSITION_TOLERANCE: f64 = 0.02;

/// Number of carousel slots.
pub const CAROUSEL_TOTAL_SLOTS: usize = 6;

/// Inspection slot index, counted from the gripper-facing slot 0.
pub const CAROUSEL_INSPECT_SLOT: usize = 4;

/// Drilling slot index, counted from the gripper-facing slot 0.
pub const CAROUSEL_DRILL_SLOT: usize = 5;

/// Time for the carousel to advance one slot.
pub const CAROUSEL_ROTATION_TIME_MS: u64 = 200;

/// Duration of one packaging cycle.
pub const PACKAGING_TIME_MS: u64 = 1000;

/// Duration of one sorting cycle.
pub const SORTING_TIME_MS: u64 = 1000;

/// Sensor: gripper at the carousel.
pub const SENSOR_GRIPPER_AT_CAROUSEL: &str = "ns:1, i:1";

/// Sensor: gripper at the start station.
pub const SENSOR_GRIPPER_AT_START: &str = "ns:1, i:2";

/// Sensor: gripper at the packaging line.
pub const SENSOR_GRIPPER_AT_PACKAGING: &str = "ns:1, i:3";

/// Sensor: gripper at the sorting line.
pub const SENSOR_GRIPPER_AT_SORTING: &str = "ns:1, i:4";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rail_bounds() {
        assert!((GRIPPER_CAROUSEL_POS - 0.0525).abs() < 1e-12);
        assert!((GRIPPER_SORTING_POS - 0.5875).abs() < 1e-12);
    }

    #[test]
    fn test_station_spacing_exceeds_double_tolerance() {
        let stations = [
            GRIPPER_CAROUSEL_POS,
            GRIPPER_START_POS,
            GRIPPER_PACKAGING_POS,
            GRIPPER_SORTING_POS,
        ];
        for pair in stations.windows(2) {
            assert!(pair[1] - pair[0] >= 2.0 * GRIPPER_POSITION_TOLERANCE);
        }
    }
}
