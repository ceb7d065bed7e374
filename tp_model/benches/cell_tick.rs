//! Per-tick hot path benchmarks.
//!
//! Every simulation tick resolves the rail position against the station map
//! and re-derives the sensor table; a motion tick also steps the gripper.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tp_common::cell::config::CellConfig;
use tp_model::gripper::{Direction, Gripper};
use tp_model::routing::StationMap;
use tp_model::sensors::SensorBank;

/// Rail positions at, near and between stations.
const POSITIONS: [f64; 4] = [0.0525, 0.21, 0.3, 0.5875];

fn bench_resolve(c: &mut Criterion) {
    let map = StationMap::new(&CellConfig::default());
    let mut group = c.benchmark_group("station_resolve");
    for position in POSITIONS {
        group.bench_with_input(BenchmarkId::from_parameter(position), &position, |b, &p| {
            b.iter(|| black_box(map.resolve(black_box(p))));
        });
    }
    group.finish();
}

fn bench_sensor_update(c: &mut Criterion) {
    let map = StationMap::new(&CellConfig::default());
    let mut bank = SensorBank::new(0.2, &map);
    c.bench_function("sensor_update", |b| {
        let mut i = 0usize;
        b.iter(|| {
            bank.update(black_box(POSITIONS[i % POSITIONS.len()]), &map);
            i += 1;
        });
    });
}

fn bench_gripper_step(c: &mut Criterion) {
    let config = CellConfig::default();
    c.bench_function("gripper_step_rail", |b| {
        let mut gripper = Gripper::new(&config);
        let mut direction = Direction::Right;
        b.iter(|| {
            if gripper.step(black_box(direction)) {
                direction = match direction {
                    Direction::Right => Direction::Left,
                    _ => Direction::Right,
                };
            }
        });
    });
}

criterion_group!(benches, bench_resolve, bench_sensor_update, bench_gripper_step);
criterion_main!(benches);
