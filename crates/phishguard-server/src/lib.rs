//! PhishGuard Server
//!
//! Wires the feature extractor and the predictor into the `scan` operation
//! and exposes it over a JSON API:
//!
//! - `POST /v1/scan` scans one URL with a chosen model
//! - `GET /v1/models` lists the registered models
//! - `POST /v1/models/reload` swaps in a freshly loaded model set
//! - `GET /health`, `GET /metrics`

pub mod config;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigOverrides, ServerConfig};
pub use pipeline::{ScanPipeline, ScanReport};
pub use routes::{create_router, AppError, ScanRequest, ScanResponse, DEFAULT_MODEL};
pub use state::AppState;
