//! Config file tests: a complete cell section, partial overrides, and
//! rejection of physically impossible layouts.

use serde::Deserialize;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tp_common::prelude::*;

#[derive(Debug, Deserialize)]
struct TestConfig {
    shared: SharedConfig,
    #[serde(default)]
    cell: CellConfig,
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("tp.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_full_cell_section() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[shared]
log_level = "debug"
service_name = "tp-cell-01"

[cell]
tick_rate_hz = 50
horizontal_speed = 0.2
vertical_speed = 0.05
up_position = 0.1
down_position = 0.0
carousel_position = 0.05
start_position = 0.2
packaging_position = 0.4
sorting_position = 0.6
position_tolerance = 0.01
carousel_slots = 8
inspect_slot = 3
drill_slot = 6
rotation_time_ms = 100
packaging_time_ms = 500
sorting_time_ms = 700
"#,
    );

    let config = TestConfig::load(&path).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert!(config.shared.validate().is_ok());
    assert!(config.cell.validate().is_ok());
    assert_eq!(config.cell.tick_period(), Duration::from_millis(20));
    assert!((config.cell.horizontal_step() - 0.004).abs() < 1e-12);
    assert_eq!(config.cell.carousel_slots, 8);
    assert_eq!(config.cell.sorting_time(), Duration::from_millis(700));
    assert_eq!(config.cell.station_position(StationId::Sorting), 0.6);
}

#[test]
fn test_missing_cell_section_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[shared]
service_name = "tp-cell-01"
"#,
    );

    let config = TestConfig::load(&path).unwrap();
    assert_eq!(config.cell, CellConfig::default());
}

#[test]
fn test_inverted_lift_rejected_on_validate() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[shared]
service_name = "tp-cell-01"

[cell]
up_position = 0.0
down_position = 0.09
"#,
    );

    let config = TestConfig::load(&path).unwrap();
    assert!(matches!(
        config.cell.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_typo_in_cell_section_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[shared]
service_name = "tp-cell-01"

[cell]
tick_rate = 100
"#,
    );

    assert!(matches!(
        TestConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}
