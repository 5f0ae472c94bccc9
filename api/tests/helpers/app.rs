use std::sync::Arc;
use std::time::Duration;

use api::{auth::generate_jwt, build_router, state::AppState};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use code_runner::{ExecutionRequest, ExecutionResult, Sandbox, SandboxError};
use db::test_utils::setup_test_db;
use serde_json::Value;
use tower::ServiceExt;
use util::problem_bank::ProblemBank;

/// One problem, "double the number", with three hidden cases.
const TEST_BANK: &str = r#"{
  "questions": [
    {
      "id": 1,
      "title": "Double It",
      "difficulty": "easy",
      "tags": ["math"],
      "description": "Return twice the input.",
      "input_format": "An integer n",
      "output_format": "2 * n",
      "constraints": ["-1000 <= n <= 1000"],
      "sample_testcase": { "input": 5, "output": 10 },
      "testcases": [
        { "input": 1, "output": 2 },
        { "input": 2, "output": 4 },
        { "input": 3, "output": 6 }
      ]
    }
  ]
}"#;

/// Pretends to run Python: doubles the argument of the `solution(..)` call.
/// Programs containing `WRONG` print `0`; programs containing `CRASH` exit 1.
pub struct DoublingSandbox;

#[async_trait]
impl Sandbox for DoublingSandbox {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, SandboxError> {
        let src = &request.source;
        if src.contains("CRASH") {
            return Ok(ExecutionResult {
                stdout: String::new(),
                stderr: "Traceback (most recent call last):\nZeroDivisionError".into(),
                exit_code: 1,
            });
        }
        let n = src
            .rsplit("solution(")
            .next()
            .and_then(|rest| rest.split(')').next())
            .and_then(|arg| arg.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let printed = if src.contains("WRONG") { 0 } else { n * 2 };
        Ok(ExecutionResult {
            stdout: format!("{printed}\n"),
            stderr: String::new(),
            exit_code: 0,
        })
    }
}

pub async fn make_test_app() -> (Router, AppState) {
    let db = setup_test_db().await;
    let bank = ProblemBank::from_json(TEST_BANK).unwrap();
    let state = AppState::new(db, Arc::new(DoublingSandbox), bank).with_step_delay(Duration::ZERO);
    (build_router(state.clone()), state)
}

/// Sends one request as `user_id` (anonymous when `None`) and returns the
/// status with the decoded JSON body.
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        let (token, _) = generate_jwt(id, false, 60).unwrap();
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
