//! HTTP API.

pub mod checkout;

use axum::Router;

use crate::state::AppState;

/// Build the versioned API router, mounted under `/api/v1`.
pub fn router() -> Router<AppState> {
    checkout::router()
}
