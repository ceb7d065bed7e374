//! Position-to-station lookup.
//!
//! A fixed table of `(coordinate, station)` entries with one shared tolerance
//! radius. Resolution picks the nearest station within tolerance, so an
//! ambiguous match (only possible with overlapping tolerance bands) goes to
//! the closest coordinate.

use tp_common::cell::config::CellConfig;
use tp_common::cell::types::StationId;

/// One checkpoint on the rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    /// Station served at this coordinate
    pub station: StationId,
    /// Nominal horizontal coordinate (m)
    pub position: f64,
}

/// Rail checkpoints of the four stations.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMap {
    checkpoints: [Checkpoint; 4],
    tolerance: f64,
}

impl StationMap {
    /// Build the map from cell geometry, in rail order.
    pub fn new(config: &CellConfig) -> Self {
        Self {
            checkpoints: StationId::ALL.map(|station| Checkpoint {
                station,
                position: config.station_position(station),
            }),
            tolerance: config.position_tolerance,
        }
    }

    /// Station whose coordinate is closest to `position`, if within tolerance.
    pub fn resolve(&self, position: f64) -> Option<StationId> {
        self.checkpoints
            .iter()
            .map(|cp| (cp.station, (cp.position - position).abs()))
            .filter(|(_, distance)| *distance <= self.tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(station, _)| station)
    }

    /// Whether `position` is within tolerance of `station`.
    pub fn is_near(&self, station: StationId, position: f64) -> bool {
        (self.position_of(station) - position).abs() <= self.tolerance
    }

    /// Nominal coordinate of `station`.
    pub fn position_of(&self, station: StationId) -> f64 {
        self.checkpoints
            .iter()
            .find(|cp| cp.station == station)
            .map(|cp| cp.position)
            .unwrap_or(f64::NAN)
    }

    /// Tolerance radius (m).
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Checkpoints in rail order.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> StationMap {
        StationMap::new(&CellConfig::default())
    }

    #[test]
    fn test_resolve_at_nominal_positions() {
        let map = map();
        let cfg = CellConfig::default();
        for station in StationId::ALL {
            assert_eq!(map.resolve(cfg.station_position(station)), Some(station));
        }
    }

    #[test]
    fn test_resolve_within_and_outside_tolerance() {
        let map = map();
        assert_eq!(map.resolve(0.2 + 0.019), Some(StationId::Start));
        assert_eq!(map.resolve(0.2 - 0.019), Some(StationId::Start));
        assert_eq!(map.resolve(0.3), None);
        assert_eq!(map.resolve(0.2 + 0.03), None);
    }

    #[test]
    fn test_resolve_prefers_nearest_on_overlap() {
        let cfg = CellConfig {
            start_position: 0.1,
            position_tolerance: 0.05,
            ..CellConfig::default()
        };
        let map = StationMap::new(&cfg);
        // carousel at 0.0525, start at 0.1: 0.08 is in both bands
        assert_eq!(map.resolve(0.08), Some(StationId::Start));
        assert_eq!(map.resolve(0.07), Some(StationId::Carousel));
    }

    #[test]
    fn test_is_near() {
        let map = map();
        assert!(map.is_near(StationId::Packaging, 0.41));
        assert!(!map.is_near(StationId::Packaging, 0.2));
        assert_eq!(map.position_of(StationId::Start), 0.2);
    }
}
