//! # TP API Library
//!
//! HTTP transport over the cell [`Service`](tp_model::Service).
//!
//! # Module Structure
//!
//! - [`config`] - API configuration: file, defaults and environment overrides
//! - [`routes`] - axum router, handlers and error mapping
//!
//! # Architecture
//!
//! ```text
//! clients ──HTTP──► tp_api (axum) ──► Service ──► Mutex<CellState>
//! visualisation ──GET /vis/*──┘            (snapshots only)
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod routes;

pub use crate::config::{ApiConfig, HttpConfig};
pub use crate::routes::{ApiError, router};
