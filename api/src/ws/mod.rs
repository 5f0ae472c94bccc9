use axum::{Router, middleware::from_fn};

use crate::{auth::guards::allow_authenticated, state::AppState, ws::rooms::ws_room_routes};

pub mod core;
pub mod rooms;

pub fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/rooms", ws_room_routes())
        .route_layer(from_fn(allow_authenticated))
        .with_state(app_state)
}
