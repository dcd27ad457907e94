//! mlib-api library - song catalog HTTP service
//!
//! Exposes the router and its collaborators so integration tests can drive
//! the full HTTP surface against substitute storage and enrichment.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod error;
pub mod pagination;
pub mod repository;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::repository::SongRepository;
use crate::services::SongEnricher;

/// Log filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "mlib_api=info,mlib_common=info,tower_http=info";

/// Build the log filter from `RUST_LOG`
///
/// Call after the `.env` file is loaded so a `RUST_LOG` set there applies.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song storage
    pub songs: Arc<dyn SongRepository>,
    /// Metadata lookup used when creating songs
    pub enricher: Arc<dyn SongEnricher>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(songs: Arc<dyn SongRepository>, enricher: Arc<dyn SongEnricher>) -> Self {
        Self {
            songs,
            enricher,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
