//! HTTP and WebSocket surface of the Code Clash battle server.

pub mod auth;
pub mod response;
pub mod routes;
pub mod state;
pub mod ws;

use axum::Router;

use crate::{routes::routes, state::AppState, ws::ws_routes};

/// `/api/...` and `/ws/...` without the request logger and CORS, which need a
/// real listener.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .nest("/api", routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state))
}
