//! Client side of the code execution sandbox.
//!
//! The sandbox speaks the Piston `/execute` contract: one program file plus a
//! language/version pair and compile/run limits in, the captured `run` stage
//! out. Limits are enforced by the sandbox; the HTTP client only carries an
//! overall request timeout so a dead sandbox surfaces as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use util::config;

/// One program to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub source: String,
}

impl ExecutionRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

/// Captured result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    /// Non-zero exit or anything written to stderr.
    pub fn is_error(&self) -> bool {
        self.exit_code != 0 || !self.stderr.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Sandbox request failed: {0}")]
    Transport(String),
    #[error("Sandbox returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Sandbox response missing run result")]
    MalformedResponse,
}

#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, SandboxError>;
}

#[derive(Serialize)]
struct PistonFile<'a> {
    name: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct PistonRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<PistonFile<'a>>,
    stdin: &'a str,
    args: Vec<String>,
    compile_timeout: u64,
    run_timeout: u64,
    compile_memory_limit: i64,
    run_memory_limit: i64,
}

#[derive(Deserialize)]
struct PistonResponse {
    run: Option<PistonStage>,
}

#[derive(Deserialize)]
struct PistonStage {
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
    code: Option<i32>,
    signal: Option<String>,
}

impl PistonStage {
    fn into_result(self) -> ExecutionResult {
        // Killed by a signal (e.g. timeout) comes back without an exit code.
        let exit_code = match (self.code, &self.signal) {
            (Some(code), _) => code,
            (None, Some(_)) => 1,
            (None, None) => 0,
        };
        ExecutionResult {
            stdout: self.stdout,
            stderr: self.stderr,
            exit_code,
        }
    }
}

/// HTTP client for a Piston-compatible sandbox.
pub struct PistonSandbox {
    client: reqwest::Client,
    base_url: String,
    language: String,
    version: String,
    compile_timeout_ms: u64,
    run_timeout_ms: u64,
}

impl PistonSandbox {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, SandboxError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SandboxError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            language: config::sandbox_language(),
            version: config::sandbox_language_version(),
            compile_timeout_ms: config::sandbox_compile_timeout_ms(),
            run_timeout_ms: config::sandbox_run_timeout_ms(),
        })
    }

    /// Sandbox configured entirely from `AppConfig`.
    pub fn from_config() -> Result<Self, SandboxError> {
        Self::new(
            config::sandbox_url(),
            Duration::from_secs(config::sandbox_request_timeout_secs()),
        )
    }

    fn body<'a>(&'a self, source: &'a str) -> PistonRequest<'a> {
        PistonRequest {
            language: &self.language,
            version: &self.version,
            files: vec![PistonFile { name: "main.py", content: source }],
            stdin: "",
            args: Vec::new(),
            compile_timeout: self.compile_timeout_ms,
            run_timeout: self.run_timeout_ms,
            compile_memory_limit: -1,
            run_memory_limit: -1,
        }
    }
}

#[async_trait]
impl Sandbox for PistonSandbox {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, SandboxError> {
        let url = format!("{}/execute", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&self.body(&request.source))
            .send()
            .await
            .map_err(|e| SandboxError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Sandbox rejected execution");
            return Err(SandboxError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PistonResponse = response
            .json()
            .await
            .map_err(|e| SandboxError::Transport(e.to_string()))?;
        let run = parsed.run.ok_or(SandboxError::MalformedResponse)?;
        let result = run.into_result();
        tracing::debug!(exit_code = result.exit_code, "Sandbox run finished");
        Ok(result)
    }
}
