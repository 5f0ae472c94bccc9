use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod common;
pub mod get;
pub mod post;
pub mod submissions;

/// `/api/rooms` routes. Every route requires authentication.
pub fn rooms_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(post::create_room))
        .route("/join", post(post::join_room))
        .route("/leave/{code}", post(post::leave_room))
        .route("/start/{code}", post(post::start_battle))
        .route("/user/my-rooms", get(get::my_rooms))
        .route("/{code}", get(get::get_room))
        .route("/{code}/scoreboard", get(get::scoreboard))
        .route("/{code}/problem", get(submissions::get_problem))
        .route("/{code}/run", post(submissions::run_sample))
        .route("/{code}/submit", post(submissions::submit))
}
