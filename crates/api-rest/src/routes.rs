//! HTTP route handlers.

pub mod benchmark;
pub mod health;
pub mod uploads;

use crate::state::AppState;
use axum::Router;

/// All routes, unversioned at the root.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(uploads::routes())
        .merge(benchmark::routes())
}
