//! Solving endpoints for a running battle: the assigned problem, sample runs
//! and graded submissions.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use marker::Superseded;

use super::common::{
    ProblemResponse, SolutionRequest, battle_context, error_response, normalize_code,
};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ws::rooms::emit::{self, SubmissionProgress};

/// GET /api/rooms/{code}/problem
///
/// The assigned problem with its boilerplate. Hidden test cases are not
/// disclosed, only their count.
///
/// ### Responses
/// - `200 OK`
/// - `400 Bad Request` if the battle has not started
/// - `403 Forbidden` if the caller is not a participant
/// - `404 Not Found`
pub async fn get_problem(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let code = normalize_code(&code);
    match battle_context(&state, &code, claims.sub).await {
        Ok((_, problem)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ProblemResponse::from(problem),
                "Problem retrieved successfully",
            )),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

/// POST /api/rooms/{code}/run
///
/// Executes the solution once, as written, and compares its output with the
/// sample's expected output when there is one.
///
/// ### Request Body
/// ```json
/// { "code": "def solution(nums, target):\n    ..." }
/// ```
pub async fn run_sample(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
    Json(req): Json<SolutionRequest>,
) -> impl IntoResponse {
    let code = normalize_code(&code);
    let (_, problem) = match battle_context(&state, &code, claims.sub).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let expected = problem.sample_testcase.as_ref().map(|tc| &tc.output);
    let run = state.driver().run_sample(&req.code, expected).await;
    tracing::info!(code = %code, user_id = claims.sub, status = ?run.status, "Sample run finished");

    (
        StatusCode::OK,
        Json(ApiResponse::success(run, "Code executed")),
    )
        .into_response()
}

/// POST /api/rooms/{code}/submit
///
/// Grades the solution against every hidden test case in order. Progress is
/// published on `room:{code}:user:{id}:submission` while the suite runs. A
/// fully passing submission scores one point for the caller.
///
/// ### Responses
/// - `200 OK` with the full report
/// - `409 Conflict` if a newer submission by the same user replaced this one
pub async fn submit(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(code): Path<String>,
    Json(req): Json<SolutionRequest>,
) -> impl IntoResponse {
    let code = normalize_code(&code);
    let user_id = claims.sub;
    let (_, problem) = match battle_context(&state, &code, user_id).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let token = state.attempts().begin(&code, user_id);
    let sink = SubmissionProgress {
        ws: state.ws_clone(),
        code: code.clone(),
        user_id,
    };

    let report = match state
        .driver()
        .run_full_suite(&req.code, &problem.testcases, &token, &sink)
        .await
    {
        Ok(report) => report,
        Err(Superseded) => {
            return error_response(StatusCode::CONFLICT, Superseded.to_string());
        }
    };

    if report.all_passed {
        match state.rooms().record_solve(&code, user_id).await {
            Ok(room) => emit::room_updated(state.ws(), &room).await,
            Err(e) => {
                tracing::error!(code = %code, user_id, error = %e, "Failed to record solve");
            }
        }
    }

    emit::submission_completed(state.ws(), &code, user_id, &report).await;
    tracing::info!(
        code = %code,
        user_id,
        passed = report.passed,
        total = report.total,
        "Submission graded"
    );

    let message = if report.all_passed {
        "All test cases passed"
    } else {
        "Submission evaluated"
    };
    (StatusCode::OK, Json(ApiResponse::success(report, message))).into_response()
}
