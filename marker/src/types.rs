//! Report types produced by the evaluation driver.

use code_runner::program::python_literal;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The program exited non-zero or wrote to stderr.
    RuntimeError,
    OutputMismatch,
    /// The sandbox could not be reached or answered garbage.
    ExecutionFailed,
}

/// Generic actual-output marker when the sandbox call itself failed.
pub const EXECUTION_ERROR_MARKER: &str = "Execution error";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub status: EntryStatus,
    pub expected_output: String,
    pub actual_output: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
    pub exit_code: Option<i32>,
}

impl ReportEntry {
    pub fn pending(expected_output: String) -> Self {
        Self {
            status: EntryStatus::Pending,
            expected_output,
            actual_output: None,
            error_kind: None,
            message: None,
            exit_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub entries: Vec<ReportEntry>,
    pub all_passed: bool,
    pub passed: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl EvaluationReport {
    /// Builds the final verdict from settled entries. An empty suite never
    /// passes.
    pub fn from_entries(entries: Vec<ReportEntry>) -> Self {
        let total = entries.len();
        let passed = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Passed)
            .count();
        let warning = (total == 0)
            .then(|| "This problem has no test cases configured; no credit awarded".to_string());
        Self {
            all_passed: total > 0 && passed == total,
            entries,
            passed,
            total,
            warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStatus {
    Pass,
    Fail,
    /// Nothing to compare against; only raw output is shown.
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRun {
    pub status: SampleStatus,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    /// Human-readable console text for the editor's output pane.
    pub console: String,
    pub expected_output: Option<String>,
    pub message: Option<String>,
}

/// Expected output as the program would print it: strings verbatim, other
/// values as Python literals.
pub fn render_expected(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => python_literal(other),
    }
}
