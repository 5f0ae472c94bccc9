use axum::{Router, routing::get};

use crate::state::AppState;

pub mod emit;
pub mod handlers;
pub mod topics;

pub fn ws_room_routes() -> Router<AppState> {
    Router::new()
        .route("/{code}", get(handlers::room_handler))
        .route("/{code}/submissions", get(handlers::submission_handler))
}
