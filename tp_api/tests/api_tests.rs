//! # HTTP Surface Tests
//!
//! Starts the router on an ephemeral port and speaks plain HTTP/1.1 over a
//! TCP stream. Covers status mapping, JSON bodies, CORS on `/vis` and the
//! request timeout.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tp_api::router;
use tp_common::prelude::*;
use tp_model::{Direction, Service};
use tp_model::stations::PuckSlot;

// ─── Helpers ────────────────────────────────────────────────────────

struct Reply {
    status: u16,
    headers: String,
    body: String,
}

async fn spawn_api(timeout: Duration) -> (SocketAddr, Service) {
    let service = Service::new(CellConfig::default()).expect("service");
    let app = router(service.clone(), timeout);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, service)
}

async fn call(addr: SocketAddr, method: &str, path: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read");
    let raw = String::from_utf8(raw).expect("utf8");

    let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");
    Reply {
        status,
        headers: head.to_ascii_lowercase(),
        body: body.to_string(),
    }
}

// ─── Control routes ─────────────────────────────────────────────────

#[tokio::test]
async fn test_ping() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;
    assert_eq!(call(addr, "GET", "/tp/ping").await.status, 200);
    service.shutdown();
}

#[tokio::test]
async fn test_new_puck_then_occupied() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;
    assert_eq!(call(addr, "POST", "/tp/puck").await.status, 200);

    let reply = call(addr, "POST", "/tp/puck").await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, CellError::SlotOccupied.to_string());
    service.shutdown();
}

#[tokio::test]
async fn test_sensor_reads() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;

    let reply = call(addr, "GET", "/tp/sensor/ns:1,%20i:2").await;
    assert_eq!(reply.status, 200);
    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["value"], true);

    let reply = call(addr, "GET", "/tp/sensor/ns:1,%20i:1").await;
    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["value"], false);

    assert_eq!(call(addr, "GET", "/tp/sensor/ns:9").await.status, 500);
    assert_eq!(call(addr, "GET", "/tp/sensor/%20").await.status, 400);
    service.shutdown();
}

#[tokio::test]
async fn test_move_stop_enable() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;

    assert_eq!(call(addr, "POST", "/tp/gripper/left").await.status, 200);
    let reply = call(addr, "POST", "/tp/gripper/right").await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body, CellError::AlreadyMoving.to_string());

    assert_eq!(call(addr, "POST", "/tp/gripper/stop").await.status, 200);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let reply = call(addr, "POST", "/tp/gripper/right").await;
    assert_eq!(reply.body, CellError::StopRequested.to_string());

    assert_eq!(call(addr, "POST", "/tp/gripper/enable").await.status, 200);
    assert_eq!(call(addr, "POST", "/tp/gripper/right").await.status, 200);
    service.shutdown();
}

#[tokio::test]
async fn test_claw_errors_are_prefixed() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;
    service.with_state(|state| state.start.restore(Puck::new(PuckColor::Red)));
    service.open_gripper().unwrap();
    // puck taken in while lowered, then raised again by hand
    service.with_state(|state| {
        while !state.gripper.step(Direction::Down) {}
    });
    service.close_gripper().unwrap();
    service.with_state(|state| {
        while !state.gripper.step(Direction::Up) {}
    });

    let reply = call(addr, "POST", "/tp/gripper/open").await;
    assert_eq!(reply.status, 500);
    assert!(reply.body.starts_with("suspicious opening of gripper: "));
    assert_eq!(service.gripper_snapshot().puck_slot, Some(Puck::new(PuckColor::Red)));
    service.shutdown();
}

#[tokio::test]
async fn test_carousel_routes() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;
    assert_eq!(call(addr, "POST", "/tp/carousel/inspect").await.status, 500);
    assert_eq!(call(addr, "POST", "/tp/carousel/drill").await.status, 500);
    assert_eq!(call(addr, "POST", "/tp/carousel/rotate").await.status, 200);

    service.with_state(|state| state.carousel.restore(Puck::new(PuckColor::Silver)));
    for _ in 0..4 {
        assert_eq!(call(addr, "POST", "/tp/carousel/rotate").await.status, 200);
    }
    let reply = call(addr, "POST", "/tp/carousel/inspect").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"color":"silver"}"#);
    service.shutdown();
}

#[tokio::test]
async fn test_packaging_and_sorting_routes() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;
    assert_eq!(call(addr, "POST", "/tp/packaging/pack").await.status, 500);
    assert_eq!(call(addr, "POST", "/tp/sorting/sort").await.status, 500);

    service.with_state(|state| state.packaging.restore(Puck::new(PuckColor::Black)));
    assert_eq!(call(addr, "POST", "/tp/packaging/pack").await.status, 200);
    assert!(service.packaging_snapshot().puck_slot.unwrap().is_packaged);
    service.shutdown();
}

// ─── Visualisation ──────────────────────────────────────────────────

#[tokio::test]
async fn test_vis_snapshots_allow_any_origin() {
    let (addr, service) = spawn_api(Duration::from_secs(5)).await;

    let reply = call(addr, "GET", "/vis/gripper").await;
    assert_eq!(reply.status, 200);
    assert!(reply.headers.contains("access-control-allow-origin: *"));
    let gripper: GripperSnapshot = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(gripper.cur_horizontal_position, 0.2);
    assert!(reply.body.contains("\"curHorizontalPosition\""));

    let reply = call(addr, "GET", "/vis/cell").await;
    let cell: CellSnapshot = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(cell.carousel.slots.len(), 6);
    assert!(cell.sensors[SENSOR_GRIPPER_AT_START]);

    for path in ["/vis/start", "/vis/carousel", "/vis/packaging", "/vis/sorting"] {
        let reply = call(addr, "GET", path).await;
        assert_eq!(reply.status, 200, "{path}");
        assert!(reply.headers.contains("access-control-allow-origin: *"));
    }

    let reply = call(addr, "GET", "/tp/ping").await;
    assert!(!reply.headers.contains("access-control-allow-origin"));
    service.shutdown();
}

// ─── Timeout ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_request_times_out() {
    let (addr, service) = spawn_api(Duration::from_millis(50)).await;
    let reply = call(addr, "POST", "/tp/carousel/rotate").await;
    assert_eq!(reply.status, 408);

    // the rotation still completes in the background
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!service.carousel_snapshot().rotating);
    service.shutdown();
}
