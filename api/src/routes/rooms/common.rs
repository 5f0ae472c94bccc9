use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use services::room::{RoomError, RoomView};
use util::problem_bank::{Problem, TestCase};

use crate::response::{ApiResponse, Empty};
use crate::state::AppState;

/// Maps lifecycle failures onto HTTP statuses.
pub fn room_error_response(err: RoomError) -> (StatusCode, Json<ApiResponse<Empty>>) {
    let status = match &err {
        RoomError::NotFound => StatusCode::NOT_FOUND,
        RoomError::Forbidden => StatusCode::FORBIDDEN,
        RoomError::AlreadyStarted | RoomError::InvalidState(_) => StatusCode::BAD_REQUEST,
        RoomError::StoreUnavailable(detail) => {
            tracing::error!(error = %detail, "Room store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<Empty>::error(message))).into_response()
}

/// Room codes are matched case-insensitively and without surrounding spaces.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub code: String,
}

/// Body of `/run` and `/submit`: the full solution text.
#[derive(Debug, Deserialize)]
pub struct SolutionRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoomResponse {
    pub code: String,
    pub created_by: i64,
    pub participants: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct JoinedRoomResponse {
    pub code: String,
    pub participants: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeftRoomResponse {
    pub new_host: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedBattleResponse {
    pub assigned_problem_id: i64,
}

/// The assigned problem as shown to players. Hidden test cases are reduced to
/// a count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResponse {
    pub id: i64,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub description: String,
    pub input_format: String,
    pub output_format: String,
    pub constraints: Vec<String>,
    pub sample_testcase: Option<TestCase>,
    pub testcase_count: usize,
    pub boilerplate: String,
}

impl From<&Problem> for ProblemResponse {
    fn from(p: &Problem) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            difficulty: p.difficulty.clone(),
            tags: p.tags.clone(),
            description: p.description.clone(),
            input_format: p.input_format.clone(),
            output_format: p.output_format.clone(),
            constraints: p.constraints.clone(),
            sample_testcase: p.sample_testcase.clone(),
            testcase_count: p.testcases.len(),
            boilerplate: code_runner::program::generate(p),
        }
    }
}

/// Loads the room and its assigned problem for a member of a running battle.
pub async fn battle_context<'a>(
    state: &'a AppState,
    code: &str,
    user_id: i64,
) -> Result<(RoomView, &'a Problem), Response> {
    let room = state
        .rooms()
        .get(code)
        .await
        .map_err(|e| room_error_response(e).into_response())?;

    if !room.is_participant(user_id) {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "You are not a participant in this room",
        ));
    }

    let Some(problem_id) = room.assigned_problem_id.filter(|_| room.battle_started) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "Battle has not started"));
    };

    let Some(problem) = state.problems().get(problem_id) else {
        tracing::error!(code = %room.code, problem_id, "Assigned problem is missing from the catalog");
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Assigned problem is not available",
        ));
    };

    Ok((room, problem))
}
