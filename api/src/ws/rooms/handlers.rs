use axum::{
    Extension, Json,
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use util::ws::serve::{WsServerOptions, serve_topic};

use super::topics::{room_topic, submission_topic};
use crate::auth::AuthUser;
use crate::response::{ApiResponse, Empty};
use crate::routes::rooms::common::{normalize_code, room_error_response};
use crate::state::AppState;

/// Checks that the room exists and the caller belongs to it.
async fn ensure_member(state: &AppState, code: &str, user_id: i64) -> Result<(), Response> {
    let room = state
        .rooms()
        .get(code)
        .await
        .map_err(|e| room_error_response(e).into_response())?;
    if !room.is_participant(user_id) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Empty>::error("You are not a participant in this room")),
        )
            .into_response());
    }
    Ok(())
}

/// GET /ws/rooms/{code}
///
/// Subscribes a room member to `room:{code}` (membership, host and battle
/// events).
pub async fn room_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
) -> Response {
    let code = normalize_code(&code);
    if let Err(resp) = ensure_member(&state, &code, claims.sub).await {
        return resp;
    }
    let manager = state.ws_clone();
    let topic = room_topic(&code);
    ws.on_upgrade(move |socket| serve_topic(socket, manager, topic, claims.sub, WsServerOptions::default()))
}

/// GET /ws/rooms/{code}/submissions
///
/// Subscribes the caller to live progress of their own graded runs.
pub async fn submission_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
) -> Response {
    let code = normalize_code(&code);
    if let Err(resp) = ensure_member(&state, &code, claims.sub).await {
        return resp;
    }
    let manager = state.ws_clone();
    let topic = submission_topic(&code, claims.sub);
    ws.on_upgrade(move |socket| serve_topic(socket, manager, topic, claims.sub, WsServerOptions::default()))
}
