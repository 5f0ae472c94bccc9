use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::common::{
    CreatedRoomResponse, JoinRoomRequest, JoinedRoomResponse, LeftRoomResponse,
    StartedBattleResponse, error_response, normalize_code, room_error_response,
};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ws::rooms::emit;

/// POST /api/rooms/create
///
/// Creates a room hosted by the caller, who becomes its only participant.
///
/// ### Responses
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": { "code": "K3F9AB", "createdBy": 12, "participants": [12] },
///   "message": "Room created successfully"
/// }
/// ```
/// - `500 Internal Server Error` if no free code could be found or the store failed
pub async fn create_room(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match state.rooms().create(claims.sub).await {
        Ok(room) => {
            emit::room_updated(state.ws(), &room).await;
            let data = CreatedRoomResponse {
                code: room.code,
                created_by: room.host_id,
                participants: room.participants,
            };
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(data, "Room created successfully")),
            )
                .into_response()
        }
        Err(e) => room_error_response(e).into_response(),
    }
}

/// POST /api/rooms/join
///
/// Adds the caller to a room. Joining a room twice is not an error.
///
/// ### Request Body
/// ```json
/// { "code": "k3f9ab" }
/// ```
///
/// ### Responses
/// - `200 OK` with `{ code, participants }`
/// - `400 Bad Request` if the code is blank
/// - `404 Not Found` if no room has this code
pub async fn join_room(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<JoinRoomRequest>,
) -> impl IntoResponse {
    let code = normalize_code(&req.code);
    if code.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Room code is required");
    }

    match state.rooms().join(&code, claims.sub).await {
        Ok(outcome) => {
            let message = if outcome.already_joined {
                "You are already in this room"
            } else {
                emit::room_updated(state.ws(), &outcome.room).await;
                if let Some(new_host) = outcome.new_host {
                    emit::host_transferred(state.ws(), &code, new_host).await;
                }
                "Joined room successfully"
            };
            let data = JoinedRoomResponse {
                code: outcome.room.code,
                participants: outcome.room.participants,
            };
            (StatusCode::OK, Json(ApiResponse::success(data, message))).into_response()
        }
        Err(e) => room_error_response(e).into_response(),
    }
}

/// POST /api/rooms/leave/{code}
///
/// Removes the caller from the room. When the host leaves, hosting passes to
/// the earliest remaining participant; `newHost` is `null` otherwise.
///
/// ### Responses
/// - `200 OK` with `{ newHost }`
/// - `400 Bad Request` if the caller is not a participant
/// - `404 Not Found`
pub async fn leave_room(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let code = normalize_code(&code);
    match state.rooms().leave(&code, claims.sub).await {
        Ok(outcome) => {
            emit::room_updated(state.ws(), &outcome.room).await;
            if let Some(new_host) = outcome.new_host {
                emit::host_transferred(state.ws(), &code, new_host).await;
            }
            let data = LeftRoomResponse {
                new_host: outcome.new_host,
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Left room successfully")),
            )
                .into_response()
        }
        Err(e) => room_error_response(e).into_response(),
    }
}

/// POST /api/rooms/start/{code}
///
/// Starts the battle and assigns a random problem. Only the host may start,
/// and only once.
///
/// ### Responses
/// - `200 OK` with `{ assignedProblemId }`
/// - `400 Bad Request` if the battle already started
/// - `403 Forbidden` if the caller is not the host
/// - `404 Not Found`
pub async fn start_battle(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let code = normalize_code(&code);
    match state.rooms().start(&code, claims.sub, state.problems()).await {
        Ok(outcome) => {
            emit::battle_started(state.ws(), &code, outcome.assigned_problem_id).await;
            emit::room_updated(state.ws(), &outcome.room).await;
            let data = StartedBattleResponse {
                assigned_problem_id: outcome.assigned_problem_id,
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Battle started successfully")),
            )
                .into_response()
        }
        Err(e) => room_error_response(e).into_response(),
    }
}
