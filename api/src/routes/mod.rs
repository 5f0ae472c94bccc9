//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → liveness probe (public)
//! - `/rooms` → room lifecycle, battle problem, runs and submissions (authenticated)

use axum::{Router, middleware::from_fn};

use crate::auth::guards::allow_authenticated;
use crate::routes::{health::health_routes, rooms::rooms_routes};
use crate::state::AppState;

pub mod health;
pub mod rooms;

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/rooms",
            rooms_routes().route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
