//! Cell orchestrator.
//!
//! [`Service`] is the single owner of the gripper, the four stations and the
//! sensor bank. All of that lives in one [`CellState`] behind one mutex; every
//! mutation, from caller operations and from background tasks alike, takes the
//! lock once and releases it before any await point.
//!
//! Background work:
//! - one motion task per running move, stepping at the tick rate until the
//!   bound is reached or its [`StopToken`] is cancelled
//! - one sensor loop re-deriving the sensor table from the rail position
//! - one short-lived job per timed station operation (rotate, package, sort)

use crate::gripper::{Direction, Gripper, StopToken};
use crate::routing::StationMap;
use crate::sensors::SensorBank;
use crate::stations::{Carousel, PackagingLine, PuckSlot, SortingLine, Start};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use tp_common::cell::config::CellConfig;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{
    CarouselSnapshot, CellSnapshot, GripperSnapshot, PackagingSnapshot, Puck, PuckColor,
    SortingSnapshot, StartSnapshot, StationId,
};
use tracing::{debug, info, trace, warn};

/// Sensor loop ticks between two position reports.
const POSITION_REPORT_TICKS: u64 = 10;

/// Ticker whose first tick lands one period from now.
fn tick_interval(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Everything the simulation mutates.
pub struct CellState {
    /// Gripper
    pub gripper: Gripper,
    /// Start buffer
    pub start: Start,
    /// Carousel
    pub carousel: Carousel,
    /// Packaging line
    pub packaging: PackagingLine,
    /// Sorting line
    pub sorting: SortingLine,
    /// Derived sensors
    pub sensors: SensorBank,
}

impl CellState {
    /// Build the initial cell: empty stations, gripper parked at start.
    ///
    /// # Errors
    /// `BadSlotIndex` if the carousel indices do not fit the slot count.
    pub fn new(config: &CellConfig, map: &StationMap) -> Result<Self, CellError> {
        let gripper = Gripper::new(config);
        let sensors = SensorBank::new(gripper.horizontal(), map);
        Ok(Self {
            gripper,
            start: Start::new(),
            carousel: Carousel::from_config(config)?,
            packaging: PackagingLine::new(config.packaging_time()),
            sorting: SortingLine::new(config.sorting_time()),
            sensors,
        })
    }

    /// Hand-off slot of a station.
    pub fn slot_mut(&mut self, station: StationId) -> &mut dyn PuckSlot {
        match station {
            StationId::Start => &mut self.start,
            StationId::Carousel => &mut self.carousel,
            StationId::Packaging => &mut self.packaging,
            StationId::Sorting => &mut self.sorting,
        }
    }

    /// Owned copy of the whole cell.
    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            gripper: self.gripper.snapshot(),
            start: self.start.snapshot(),
            carousel: self.carousel.snapshot(),
            packaging: self.packaging.snapshot(),
            sorting: self.sorting.snapshot(),
            sensors: self.sensors.snapshot(),
        }
    }
}

struct Shared {
    state: Mutex<CellState>,
    map: StationMap,
    config: CellConfig,
    shutdown: StopToken,
}

/// Handle to the running cell simulation.
///
/// Cloning is cheap; every clone drives the same cell.
#[derive(Clone)]
pub struct Service {
    inner: Arc<Shared>,
}

fn rejected<T>(op: &str, result: Result<T, CellError>) -> Result<T, CellError> {
    result.inspect_err(|err| warn!("{} rejected: {}", op, err))
}

impl Service {
    /// Build the cell and start the sensor loop.
    ///
    /// Must be called from within a tokio runtime. The configuration is
    /// expected to be validated by the caller (`CellConfig::validate`).
    ///
    /// # Errors
    /// `BadSlotIndex` if the carousel indices do not fit the slot count.
    pub fn new(config: CellConfig) -> Result<Self, CellError> {
        let map = StationMap::new(&config);
        let state = CellState::new(&config, &map)?;
        let service = Self {
            inner: Arc::new(Shared {
                state: Mutex::new(state),
                map,
                config,
                shutdown: StopToken::new(),
            }),
        };
        service.spawn_sensor_loop();
        info!(
            "Cell started: {} Hz, {} carousel slots",
            service.inner.config.tick_rate_hz, service.inner.config.carousel_slots
        );
        Ok(service)
    }

    /// Cell configuration in use.
    pub fn config(&self) -> &CellConfig {
        &self.inner.config
    }

    /// Rail checkpoint table.
    pub fn station_map(&self) -> &StationMap {
        &self.inner.map
    }

    /// Stop the sensor loop and cancel any running motion.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.state.lock().gripper.stop();
        info!("Cell shut down");
    }

    /// The loop holds a weak handle and ends once every `Service` clone is
    /// dropped, even without `shutdown`.
    fn spawn_sensor_loop(&self) {
        let weak: Weak<Shared> = Arc::downgrade(&self.inner);
        let mut ticker = tick_interval(self.inner.config.tick_period());
        tokio::spawn(async move {
            let mut ticks: u64 = 0;
            loop {
                ticker.tick().await;
                let Some(shared) = weak.upgrade() else {
                    debug!("Sensor loop released after {} ticks", ticks);
                    break;
                };
                if shared.shutdown.is_cancelled() {
                    debug!("Sensor loop stopped after {} ticks", ticks);
                    break;
                }
                let mut state = shared.state.lock();
                let state = &mut *state;
                state.sensors.update(state.gripper.horizontal(), &shared.map);
                ticks += 1;
                if ticks % POSITION_REPORT_TICKS == 0 {
                    trace!(
                        "Gripper at x={:.4}, y={:.4}",
                        state.gripper.horizontal(),
                        state.gripper.vertical()
                    );
                }
            }
        });
    }

    fn spawn_motion(&self, direction: Direction, token: StopToken) {
        let shared = Arc::clone(&self.inner);
        let mut ticker = tick_interval(shared.config.tick_period());
        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                let mut state = shared.state.lock();
                if token.is_cancelled() || state.gripper.step(direction) {
                    state.gripper.finish_move(direction);
                    break;
                }
            }
        });
    }

    // ─── Start ──────────────────────────────────────────────────────

    /// Put a puck of random colour on the start buffer.
    pub fn place_new_start_puck(&self) -> Result<Puck, CellError> {
        let color = PuckColor::ALL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(PuckColor::Red);
        let puck = Puck::new(color);
        rejected("new puck", self.inner.state.lock().start.place(puck))?;
        info!("New {} puck at start", color);
        Ok(puck)
    }

    // ─── Sensors ────────────────────────────────────────────────────

    /// Current value of a position sensor.
    pub fn sensor_value(&self, id: &str) -> Result<bool, CellError> {
        rejected("sensor read", self.inner.state.lock().sensors.value(id))
    }

    /// Owned copy of the sensor table.
    pub fn sensors(&self) -> BTreeMap<String, bool> {
        self.inner.state.lock().sensors.snapshot()
    }

    // ─── Gripper motion ─────────────────────────────────────────────

    /// Start moving toward the bound of `direction`.
    ///
    /// Returns immediately; the motion progresses in the background.
    pub fn move_gripper(&self, direction: Direction) -> Result<(), CellError> {
        let token = rejected(
            "gripper move",
            self.inner.state.lock().gripper.begin_move(direction),
        )?;
        self.spawn_motion(direction, token);
        Ok(())
    }

    /// Move toward the carousel end of the rail.
    pub fn move_gripper_left(&self) -> Result<(), CellError> {
        self.move_gripper(Direction::Left)
    }

    /// Move toward the sorting end of the rail.
    pub fn move_gripper_right(&self) -> Result<(), CellError> {
        self.move_gripper(Direction::Right)
    }

    /// Raise the lift.
    pub fn move_gripper_up(&self) -> Result<(), CellError> {
        self.move_gripper(Direction::Up)
    }

    /// Lower the lift.
    pub fn move_gripper_down(&self) -> Result<(), CellError> {
        self.move_gripper(Direction::Down)
    }

    /// Soft stop. The running motion halts within one tick.
    pub fn stop_gripper(&self) {
        self.inner.state.lock().gripper.stop();
        debug!("Gripper stop requested");
    }

    /// Accept move requests again after a stop.
    pub fn enable_moving_gripper(&self) {
        self.inner.state.lock().gripper.enable_moving();
    }

    // ─── Hand-off ───────────────────────────────────────────────────

    /// Open the claw, releasing a held puck into the station below.
    ///
    /// Without a puck this only opens the claw. With a puck the gripper must
    /// be idle, lowered and over a station; otherwise it stays closed and
    /// keeps the puck. A station refusing the puck leaves it in the gripper.
    pub fn open_gripper(&self) -> Result<(), CellError> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        if !state.gripper.holds_puck() {
            state.gripper.open();
            return Ok(());
        }
        if state.gripper.is_moving() {
            return rejected("gripper open", Err(CellError::AlreadyMoving));
        }
        if !state.gripper.is_down() {
            return rejected(
                "gripper open",
                Err(CellError::invalid_handoff("cannot release while raised")),
            );
        }
        let position = state.gripper.horizontal();
        let station = self
            .inner
            .map
            .resolve(position)
            .ok_or(CellError::NoStationAtPosition { position });
        let station = rejected("gripper open", station)?;

        state.gripper.open();
        let puck = rejected("gripper open", state.gripper.release_out())?;
        if let Err(err) = state.slot_mut(station).place(puck) {
            state.gripper.restore(puck);
            state.gripper.close();
            warn!("{} refused {} puck: {}", station, puck.color, err);
            return Err(err);
        }
        info!("Placed {} puck at {}", puck.color, station);
        Ok(())
    }

    /// Close the claw, picking up the puck from the station below.
    ///
    /// A pick-up is attempted only when the gripper is empty and lowered.
    /// The claw ends closed in every case.
    pub fn close_gripper(&self) -> Result<(), CellError> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        let result = if !state.gripper.holds_puck() && state.gripper.is_down() {
            self.take_into_gripper(state)
        } else {
            Ok(())
        };
        state.gripper.close();
        rejected("gripper close", result)
    }

    fn take_into_gripper(&self, state: &mut CellState) -> Result<(), CellError> {
        let position = state.gripper.horizontal();
        let station = match self.inner.map.resolve(position) {
            Some(StationId::Sorting) => {
                return Err(CellError::invalid_handoff(
                    "pucks are never taken from the sorting line",
                ));
            }
            Some(station) => station,
            None => return Err(CellError::NoStationAtPosition { position }),
        };

        let puck = state.slot_mut(station).take()?;
        if let Err(err) = state.gripper.take_in(puck) {
            state.slot_mut(station).restore(puck);
            warn!("Returned {} puck to {}: {}", puck.color, station, err);
            return Err(err);
        }
        info!("Took {} puck from {}", puck.color, station);
        Ok(())
    }

    // ─── Timed station operations ───────────────────────────────────

    /// Run a timed operation: `begin` validates and marks the station busy,
    /// `finish` commits once `duration` has elapsed since the call began.
    ///
    /// The commit runs as its own task, so a dropped caller cannot leave the
    /// station busy.
    async fn run_timed<T, B, F>(&self, op: &'static str, begin: B, finish: F) -> Result<T, CellError>
    where
        T: Send + 'static,
        B: FnOnce(&mut CellState) -> Result<Duration, CellError> + Send,
        F: FnOnce(&mut CellState) -> T + Send + 'static,
    {
        let started = Instant::now();
        let duration = {
            let mut state = self.inner.state.lock();
            begin(&mut state)
        };
        let duration = rejected(op, duration)?;

        let shared = Arc::clone(&self.inner);
        let job = tokio::spawn(async move {
            sleep_until(started + duration).await;
            let mut state = shared.state.lock();
            finish(&mut state)
        });
        job.await
            .map_err(|err| CellError::JobAborted(format!("{}: {}", op, err)))
    }

    /// Advance the carousel by one slot, returning after the rotation time.
    pub async fn rotate_carousel(&self) -> Result<(), CellError> {
        self.run_timed(
            "carousel rotate",
            |state| state.carousel.begin_rotation(),
            |state| state.carousel.finish_rotation(),
        )
        .await?;
        debug!("Carousel rotated");
        Ok(())
    }

    /// Read the puck under the inspection position.
    pub fn inspect_puck(&self) -> Result<Puck, CellError> {
        let puck = rejected("carousel inspect", self.inner.state.lock().carousel.inspect())?;
        info!("Inspected {} puck", puck.color);
        Ok(puck)
    }

    /// Fire the drill over the drilling position.
    pub fn drill_puck(&self) -> Result<(), CellError> {
        rejected("carousel drill", self.inner.state.lock().carousel.drill())
    }

    /// Package the puck on the packaging line.
    pub async fn package_puck(&self) -> Result<Puck, CellError> {
        let puck = self
            .run_timed(
                "packaging",
                |state| state.packaging.begin_packaging(),
                |state| state.packaging.finish_packaging(),
            )
            .await?
            .ok_or(CellError::SlotEmpty)?;
        info!("Packaged {} puck", puck.color);
        Ok(puck)
    }

    /// Sort the puck on the sorting line into the output ledger.
    pub async fn sort_puck(&self) -> Result<Puck, CellError> {
        let puck = self
            .run_timed(
                "sorting",
                |state| state.sorting.begin_sorting(),
                |state| state.sorting.finish_sorting(),
            )
            .await?
            .ok_or(CellError::SlotEmpty)?;
        info!("Sorted {} puck", puck.color);
        Ok(puck)
    }

    // ─── Snapshots ──────────────────────────────────────────────────

    /// Gripper state.
    pub fn gripper_snapshot(&self) -> GripperSnapshot {
        self.inner.state.lock().gripper.snapshot()
    }

    /// Start buffer state.
    pub fn start_snapshot(&self) -> StartSnapshot {
        self.inner.state.lock().start.snapshot()
    }

    /// Carousel state.
    pub fn carousel_snapshot(&self) -> CarouselSnapshot {
        self.inner.state.lock().carousel.snapshot()
    }

    /// Packaging line state.
    pub fn packaging_snapshot(&self) -> PackagingSnapshot {
        self.inner.state.lock().packaging.snapshot()
    }

    /// Sorting line state.
    pub fn sorting_snapshot(&self) -> SortingSnapshot {
        self.inner.state.lock().sorting.snapshot()
    }

    /// Whole cell, taken under one lock.
    pub fn snapshot(&self) -> CellSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Run `f` against the live state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut CellState) -> R) -> R {
        f(&mut self.inner.state.lock())
    }
}
