//! Scripted cell driver.
//!
//! [`Driver`] issues operations against a [`Service`] the way an external
//! controller would: it starts a motion, polls a position sensor until the
//! gripper arrives and stops it. Every wait is bounded and fails with
//! `CellError::Timeout`.
//!
//! Vertical motion has no sensor, so lowering and raising wait a fixed
//! settle time instead.

use crate::gripper::Direction;
use crate::sensors::sensor_id;
use crate::service::Service;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tp_common::cell::error::CellError;
use tp_common::cell::types::{Puck, StationId};
use tracing::{debug, info};

/// Driver timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    /// Delay between two sensor polls
    pub poll_interval: Duration,
    /// Upper bound for reaching a station
    pub sensor_timeout: Duration,
    /// Time granted to a full lift stroke
    pub vertical_settle: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1),
            sensor_timeout: Duration::from_secs(10),
            vertical_settle: Duration::from_secs(2),
        }
    }
}

/// Drives the cell through scripted sequences.
#[derive(Clone)]
pub struct Driver {
    service: Service,
    config: DriverConfig,
}

impl Driver {
    /// Wrap a service handle.
    pub fn new(service: Service, config: DriverConfig) -> Self {
        Self { service, config }
    }

    /// The driven service.
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Poll a sensor until it reads true.
    pub async fn wait_for_sensor(&self, id: &str, timeout: Duration) -> Result<(), CellError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.service.sensor_value(id)? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(CellError::Timeout {
                    what: format!("sensor {}", id),
                    after: timeout,
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Poll until neither axis is moving.
    pub async fn wait_until_idle(&self, timeout: Duration) -> Result<(), CellError> {
        let deadline = Instant::now() + timeout;
        while self.service.gripper_snapshot().is_moving() {
            if Instant::now() >= deadline {
                return Err(CellError::Timeout {
                    what: "gripper idle".to_string(),
                    after: timeout,
                });
            }
            sleep(self.config.poll_interval).await;
        }
        Ok(())
    }

    /// Stop the gripper, wait for the motion task to exit, then re-enable.
    pub async fn halt(&self) -> Result<(), CellError> {
        self.service.stop_gripper();
        self.wait_until_idle(self.config.sensor_timeout).await?;
        self.service.enable_moving_gripper();
        Ok(())
    }

    /// Move along the rail until the station's sensor fires.
    pub async fn travel_to(&self, station: StationId) -> Result<(), CellError> {
        let position = self.service.gripper_snapshot().cur_horizontal_position;
        let map = self.service.station_map();
        if map.is_near(station, position) {
            return Ok(());
        }
        let direction = if map.position_of(station) < position {
            Direction::Left
        } else {
            Direction::Right
        };

        debug!("Travelling {:?} to {}", direction, station);
        self.service.enable_moving_gripper();
        self.service.move_gripper(direction)?;
        let arrived = self
            .wait_for_sensor(sensor_id(station), self.config.sensor_timeout)
            .await;
        self.halt().await?;
        arrived
    }

    async fn stroke(&self, direction: Direction) -> Result<(), CellError> {
        self.service.enable_moving_gripper();
        self.service.move_gripper(direction)?;
        sleep(self.config.vertical_settle).await;
        self.halt().await
    }

    /// Lower the lift fully.
    pub async fn lower(&self) -> Result<(), CellError> {
        self.stroke(Direction::Down).await
    }

    /// Raise the lift fully.
    pub async fn raise(&self) -> Result<(), CellError> {
        self.stroke(Direction::Up).await
    }

    /// Grab the puck of the station below.
    pub async fn pick_up(&self) -> Result<(), CellError> {
        self.service.open_gripper()?;
        self.lower().await?;
        self.service.close_gripper()?;
        self.raise().await
    }

    /// Release the held puck into the station below.
    pub async fn put_down(&self) -> Result<(), CellError> {
        self.lower().await?;
        self.service.open_gripper()?;
        self.raise().await?;
        self.service.close_gripper()
    }

    // ─── Scenarios ──────────────────────────────────────────────────

    /// New puck from start onto carousel slot 0.
    pub async fn move_puck_to_carousel(&self) -> Result<Puck, CellError> {
        let puck = self.service.place_new_start_puck()?;
        self.travel_to(StationId::Start).await?;
        self.pick_up().await?;
        self.travel_to(StationId::Carousel).await?;
        self.put_down().await?;
        info!("Moved {} puck to carousel", puck.color);
        Ok(puck)
    }

    /// New puck onto the carousel, then rotated under the inspection position.
    pub async fn inspect_new_puck(&self) -> Result<Puck, CellError> {
        self.move_puck_to_carousel().await?;
        self.rotate_by(self.service.config().inspect_slot).await?;
        self.service.inspect_puck()
    }

    /// Whole line: start, carousel (inspect, drill), packaging, sorting.
    ///
    /// Returns the sorted puck.
    pub async fn run_full_line(&self) -> Result<Puck, CellError> {
        let cfg = self.service.config().clone();

        self.move_puck_to_carousel().await?;
        self.rotate_by(cfg.inspect_slot).await?;
        let inspected = self.service.inspect_puck()?;
        self.rotate_by((cfg.drill_slot + cfg.carousel_slots - cfg.inspect_slot) % cfg.carousel_slots)
            .await?;
        self.service.drill_puck()?;
        self.rotate_by((cfg.carousel_slots - cfg.drill_slot) % cfg.carousel_slots)
            .await?;

        self.pick_up().await?;
        self.travel_to(StationId::Packaging).await?;
        self.put_down().await?;
        self.service.package_puck().await?;

        self.pick_up().await?;
        self.travel_to(StationId::Sorting).await?;
        self.put_down().await?;
        let sorted = self.service.sort_puck().await?;

        info!(
            "Line finished: inspected {}, sorted {}",
            inspected.color, sorted.color
        );
        Ok(sorted)
    }

    async fn rotate_by(&self, steps: usize) -> Result<(), CellError> {
        for _ in 0..steps {
            self.service.rotate_carousel().await?;
        }
        Ok(())
    }
}
