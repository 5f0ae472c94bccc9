use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::common::{normalize_code, room_error_response};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/rooms/{code}
///
/// Full room projection: participants with scores, host, and battle clock.
/// Clients use this to resynchronise after reconnecting to the room topic.
///
/// ### Responses
/// - `200 OK` with the room
/// - `404 Not Found` if no room has this code
pub async fn get_room(State(state): State<AppState>, Path(code): Path<String>) -> impl IntoResponse {
    match state.rooms().get(&normalize_code(&code)).await {
        Ok(room) => (
            StatusCode::OK,
            Json(ApiResponse::success(room, "Room retrieved successfully")),
        )
            .into_response(),
        Err(e) => room_error_response(e).into_response(),
    }
}

/// GET /api/rooms/user/my-rooms
///
/// Rooms the caller hosts or has joined, oldest first.
pub async fn my_rooms(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match state.rooms().list_for_user(claims.sub).await {
        Ok(rooms) => (
            StatusCode::OK,
            Json(ApiResponse::success(rooms, "Rooms retrieved successfully")),
        )
            .into_response(),
        Err(e) => room_error_response(e).into_response(),
    }
}

/// GET /api/rooms/{code}/scoreboard
pub async fn scoreboard(State(state): State<AppState>, Path(code): Path<String>) -> impl IntoResponse {
    match state.rooms().scoreboard(&normalize_code(&code)).await {
        Ok(ranking) => (
            StatusCode::OK,
            Json(ApiResponse::success(ranking, "Scoreboard retrieved successfully")),
        )
            .into_response(),
        Err(e) => room_error_response(e).into_response(),
    }
}
