//! REST API for the sizing optimizer.
//!
//! Endpoints:
//! - `POST /optimize` runs one optimisation
//! - `GET /scenarios` lists cost scenarios and presets
//! - `GET /cost-assumptions?scenario=&year=` returns the resolved assumption set
//! - `GET /health` liveness probe

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::cost::assumptions::CostTable;
use crate::optimizer::grid::GridSearch;

pub use types::{CostAssumptionsResponse, ErrorResponse, ScenariosResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`; handlers only read it.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Cost assumptions used for every request.
    pub table: Arc<CostTable>,
    /// Search strategy used for every request.
    pub search: GridSearch,
}

impl AppState {
    /// State with the default grid.
    pub fn new(table: Arc<CostTable>) -> Self {
        Self {
            table,
            search: GridSearch::default(),
        }
    }

    /// Replace the search strategy.
    pub fn with_search(mut self, search: GridSearch) -> Self {
        self.search = search;
        self
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/optimize", post(handlers::post_optimize))
        .route("/scenarios", get(handlers::get_scenarios))
        .route("/cost-assumptions", get(handlers::get_cost_assumptions))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
