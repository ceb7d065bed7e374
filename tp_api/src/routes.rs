//! HTTP routes.
//!
//! One route per orchestrator operation under `/tp`, read-only snapshots under
//! `/vis` for the visualisation poller. Every handler returns 200 on success,
//! 500 with the error text on a cell error, 400 for a blank sensor id and 408
//! once the configured request timeout elapses.

use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tp_common::cell::error::CellError;
use tp_common::cell::types::{
    CarouselSnapshot, CellSnapshot, GripperSnapshot, PackagingSnapshot, PuckColor,
    SortingSnapshot, StartSnapshot,
};
use tp_model::Service;
use tracing::{error, warn};

/// Request failure mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The cell rejected the operation.
    #[error("{0}")]
    Cell(#[from] CellError),

    /// Claw operation rejected; `action` is `opening` or `closing`.
    #[error("suspicious {action} of gripper: {source}")]
    Gripper {
        /// Claw action attempted.
        action: &'static str,
        /// Underlying cell error.
        source: CellError,
    },

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Cell(_) | ApiError::Gripper { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        };
        (status, self.to_string()).into_response()
    }
}

type ApiResult<T = StatusCode> = Result<T, ApiError>;

/// Body of `GET /tp/sensor/{sensor_id}`.
#[derive(Debug, Serialize)]
pub struct SensorResponse {
    /// Sensor reading.
    pub value: bool,
}

/// Body of `POST /tp/carousel/inspect`.
#[derive(Debug, Serialize)]
pub struct InspectResponse {
    /// Colour of the inspected puck.
    pub color: PuckColor,
}

/// Build the router over a service handle.
pub fn router(service: Service, timeout: Duration) -> Router {
    let tp = Router::new()
        .route("/tp/ping", get(ping))
        .route("/tp/puck", post(new_puck))
        .route("/tp/sensor/{sensor_id}", get(sensor))
        .route("/tp/gripper/left", post(gripper_left))
        .route("/tp/gripper/right", post(gripper_right))
        .route("/tp/gripper/up", post(gripper_up))
        .route("/tp/gripper/down", post(gripper_down))
        .route("/tp/gripper/open", post(gripper_open))
        .route("/tp/gripper/close", post(gripper_close))
        .route("/tp/gripper/stop", post(gripper_stop))
        .route("/tp/gripper/enable", post(gripper_enable))
        .route("/tp/carousel/rotate", post(carousel_rotate))
        .route("/tp/carousel/inspect", post(carousel_inspect))
        .route("/tp/carousel/drill", post(carousel_drill))
        .route("/tp/packaging/pack", post(packaging_pack))
        .route("/tp/sorting/sort", post(sorting_sort));

    let vis = Router::new()
        .route("/vis/start", get(vis_start))
        .route("/vis/gripper", get(vis_gripper))
        .route("/vis/carousel", get(vis_carousel))
        .route("/vis/packaging", get(vis_packaging))
        .route("/vis/sorting", get(vis_sorting))
        .route("/vis/cell", get(vis_cell))
        .layer(middleware::map_response(allow_any_origin));

    tp.merge(vis)
        .layer(middleware::from_fn_with_state(timeout, enforce_timeout))
        .with_state(service)
}

async fn enforce_timeout(State(timeout): State<Duration>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!("{} timed out after {:?}", path, timeout);
            ApiError::Timeout(timeout).into_response()
        }
    }
}

async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

// ─── Control ────────────────────────────────────────────────────────

async fn ping() -> StatusCode {
    StatusCode::OK
}

async fn new_puck(State(service): State<Service>) -> ApiResult {
    service.place_new_start_puck()?;
    Ok(StatusCode::OK)
}

async fn sensor(
    State(service): State<Service>,
    Path(sensor_id): Path<String>,
) -> ApiResult<Json<SensorResponse>> {
    if sensor_id.trim().is_empty() {
        return Err(ApiError::BadRequest("missing sensor id field".to_string()));
    }
    let value = service.sensor_value(&sensor_id)?;
    Ok(Json(SensorResponse { value }))
}

async fn gripper_left(State(service): State<Service>) -> ApiResult {
    service.move_gripper_left()?;
    Ok(StatusCode::OK)
}

async fn gripper_right(State(service): State<Service>) -> ApiResult {
    service.move_gripper_right()?;
    Ok(StatusCode::OK)
}

async fn gripper_up(State(service): State<Service>) -> ApiResult {
    service.move_gripper_up()?;
    Ok(StatusCode::OK)
}

async fn gripper_down(State(service): State<Service>) -> ApiResult {
    service.move_gripper_down()?;
    Ok(StatusCode::OK)
}

async fn gripper_open(State(service): State<Service>) -> ApiResult {
    service.open_gripper().map_err(|source| {
        error!("open gripper: {}", source);
        ApiError::Gripper {
            action: "opening",
            source,
        }
    })?;
    Ok(StatusCode::OK)
}

async fn gripper_close(State(service): State<Service>) -> ApiResult {
    service.close_gripper().map_err(|source| {
        error!("close gripper: {}", source);
        ApiError::Gripper {
            action: "closing",
            source,
        }
    })?;
    Ok(StatusCode::OK)
}

async fn gripper_stop(State(service): State<Service>) -> StatusCode {
    service.stop_gripper();
    StatusCode::OK
}

async fn gripper_enable(State(service): State<Service>) -> StatusCode {
    service.enable_moving_gripper();
    StatusCode::OK
}

async fn carousel_rotate(State(service): State<Service>) -> ApiResult {
    service.rotate_carousel().await?;
    Ok(StatusCode::OK)
}

async fn carousel_inspect(State(service): State<Service>) -> ApiResult<Json<InspectResponse>> {
    let puck = service.inspect_puck()?;
    Ok(Json(InspectResponse { color: puck.color }))
}

async fn carousel_drill(State(service): State<Service>) -> ApiResult {
    service.drill_puck()?;
    Ok(StatusCode::OK)
}

async fn packaging_pack(State(service): State<Service>) -> ApiResult {
    service.package_puck().await?;
    Ok(StatusCode::OK)
}

async fn sorting_sort(State(service): State<Service>) -> ApiResult {
    service.sort_puck().await?;
    Ok(StatusCode::OK)
}

// ─── Visualisation ──────────────────────────────────────────────────

async fn vis_start(State(service): State<Service>) -> Json<StartSnapshot> {
    Json(service.start_snapshot())
}

async fn vis_gripper(State(service): State<Service>) -> Json<GripperSnapshot> {
    Json(service.gripper_snapshot())
}

async fn vis_carousel(State(service): State<Service>) -> Json<CarouselSnapshot> {
    Json(service.carousel_snapshot())
}

async fn vis_packaging(State(service): State<Service>) -> Json<PackagingSnapshot> {
    Json(service.packaging_snapshot())
}

async fn vis_sorting(State(service): State<Service>) -> Json<SortingSnapshot> {
    Json(service.sorting_snapshot())
}

async fn vis_cell(State(service): State<Service>) -> Json<CellSnapshot> {
    Json(service.snapshot())
}
