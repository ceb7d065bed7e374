//! Derived position sensors.
//!
//! One boolean per station checkpoint, true iff the gripper's rail position
//! lies within tolerance of that checkpoint. There is no vertical sensor.

use crate::routing::StationMap;
use std::collections::BTreeMap;
use tp_common::cell::error::CellError;
use tp_common::cell::types::StationId;
use tp_common::consts::{
    SENSOR_GRIPPER_AT_CAROUSEL, SENSOR_GRIPPER_AT_PACKAGING, SENSOR_GRIPPER_AT_SORTING,
    SENSOR_GRIPPER_AT_START,
};

/// Sensor id reporting the gripper at `station`.
pub fn sensor_id(station: StationId) -> &'static str {
    match station {
        StationId::Carousel => SENSOR_GRIPPER_AT_CAROUSEL,
        StationId::Start => SENSOR_GRIPPER_AT_START,
        StationId::Packaging => SENSOR_GRIPPER_AT_PACKAGING,
        StationId::Sorting => SENSOR_GRIPPER_AT_SORTING,
    }
}

#[derive(Debug, Clone, Copy)]
struct Sensor {
    id: &'static str,
    station: StationId,
    value: bool,
}

/// Sensor table, recomputed from the live rail position.
#[derive(Debug, Clone)]
pub struct SensorBank {
    sensors: [Sensor; 4],
}

impl SensorBank {
    /// Create a bank already derived from `position`.
    pub fn new(position: f64, map: &StationMap) -> Self {
        let mut bank = Self {
            sensors: StationId::ALL.map(|station| Sensor {
                id: sensor_id(station),
                station,
                value: false,
            }),
        };
        bank.update(position, map);
        bank
    }

    /// Recompute every sensor from the rail position.
    pub fn update(&mut self, position: f64, map: &StationMap) {
        for sensor in &mut self.sensors {
            sensor.value = map.is_near(sensor.station, position);
        }
    }

    /// Current value of a sensor.
    ///
    /// # Errors
    /// `SensorNotFound` for an unknown id.
    pub fn value(&self, id: &str) -> Result<bool, CellError> {
        self.sensors
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.value)
            .ok_or_else(|| CellError::SensorNotFound(id.to_string()))
    }

    /// Owned copy of the table.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.sensors
            .iter()
            .map(|s| (s.id.to_string(), s.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_common::cell::config::CellConfig;

    #[test]
    fn test_exactly_one_sensor_at_each_station() {
        let cfg = CellConfig::default();
        let map = StationMap::new(&cfg);
        for station in StationId::ALL {
            let bank = SensorBank::new(cfg.station_position(station), &map);
            for other in StationId::ALL {
                assert_eq!(bank.value(sensor_id(other)), Ok(other == station));
            }
        }
    }

    #[test]
    fn test_no_sensor_between_stations() {
        let map = StationMap::new(&CellConfig::default());
        let bank = SensorBank::new(0.3, &map);
        assert!(bank.snapshot().values().all(|v| !v));
    }

    #[test]
    fn test_unknown_sensor() {
        let map = StationMap::new(&CellConfig::default());
        let bank = SensorBank::new(0.2, &map);
        assert_eq!(
            bank.value("ns:1, i:9"),
            Err(CellError::SensorNotFound("ns:1, i:9".to_string()))
        );
    }
}
