//! Runs solutions against the sandbox and grades the results.
//!
//! A graded suite is strictly sequential: test `i + 1` is compiled and sent
//! only after test `i` came back. Failures are scoped to their own entry and
//! never stop the remaining tests.

use std::sync::Arc;
use std::time::Duration;

use code_runner::program::PreparedSolution;
use code_runner::{ExecutionRequest, ExecutionResult, Sandbox, SandboxError};
use serde_json::Value;
use util::config;
use util::problem_bank::TestCase;

use crate::attempts::AttemptToken;
use crate::comparators::WhitespaceComparator;
use crate::error::Superseded;
use crate::traits::comparator::OutputComparator;
use crate::traits::progress::ProgressSink;
use crate::types::{
    EXECUTION_ERROR_MARKER, EntryStatus, ErrorKind, EvaluationReport, ReportEntry, SampleRun,
    SampleStatus, render_expected,
};

pub struct EvaluationDriver {
    sandbox: Arc<dyn Sandbox>,
    comparator: Box<dyn OutputComparator>,
    step_delay: Duration,
}

impl EvaluationDriver {
    /// Driver with whitespace-insensitive comparison and the configured
    /// inter-step delay.
    pub fn new(sandbox: Arc<dyn Sandbox>) -> Self {
        Self {
            sandbox,
            comparator: Box::new(WhitespaceComparator),
            step_delay: Duration::from_millis(config::evaluation_step_delay_ms()),
        }
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    pub fn with_comparator(mut self, comparator: Box<dyn OutputComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Runs the solution as written, once.
    pub async fn run_sample(&self, solution: &str, sample_expected: Option<&Value>) -> SampleRun {
        let expected_output = sample_expected.map(render_expected);

        let result = match self.sandbox.execute(ExecutionRequest::new(solution)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Sample run could not reach the sandbox");
                return SampleRun {
                    status: SampleStatus::Fail,
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: None,
                    console: format!("Error executing code: {e}"),
                    expected_output,
                    message: Some(e.to_string()),
                };
            }
        };

        let status = if result.is_error() {
            SampleStatus::Fail
        } else {
            match &expected_output {
                Some(expected) if !result.stdout.trim().is_empty() => {
                    if self.comparator.matches(expected, &result.stdout) {
                        SampleStatus::Pass
                    } else {
                        SampleStatus::Fail
                    }
                }
                _ => SampleStatus::Inconclusive,
            }
        };

        SampleRun {
            status,
            console: console_text(&result),
            stdout: result.stdout,
            stderr: result.stderr,
            exit_code: Some(result.exit_code),
            expected_output,
            message: None,
        }
    }

    /// Grades `solution` against every test case in order.
    ///
    /// Each entry transition is pushed to `sink`. If `token` stops being the
    /// current attempt the suite returns [`Superseded`] as soon as the
    /// in-flight sandbox call returns, without writing that result.
    pub async fn run_full_suite(
        &self,
        solution: &str,
        testcases: &[TestCase],
        token: &AttemptToken,
        sink: &dyn ProgressSink,
    ) -> Result<EvaluationReport, Superseded> {
        let prepared = PreparedSolution::new(solution);
        let mut entries: Vec<ReportEntry> = testcases
            .iter()
            .map(|tc| ReportEntry::pending(render_expected(&tc.output)))
            .collect();

        if testcases.is_empty() {
            tracing::warn!("Graded run requested for a problem without test cases");
        }

        for (i, entry) in entries.iter().enumerate() {
            ensure_current(token)?;
            sink.entry_updated(i, entry).await;
        }

        for (i, testcase) in testcases.iter().enumerate() {
            if i > 0 && !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }

            ensure_current(token)?;
            entries[i].status = EntryStatus::Running;
            sink.entry_updated(i, &entries[i]).await;

            let program = prepared.program_for(&testcase.input);
            let result = self.sandbox.execute(ExecutionRequest::new(program)).await;

            if !token.is_current() {
                tracing::info!(index = i, "Discarding result of superseded attempt");
                return Err(Superseded);
            }
            let expected = std::mem::take(&mut entries[i].expected_output);
            entries[i] = self.classify(expected, result);
            tracing::debug!(index = i, status = ?entries[i].status, "Test case settled");
            sink.entry_updated(i, &entries[i]).await;
        }

        let report = EvaluationReport::from_entries(entries);
        tracing::info!(passed = report.passed, total = report.total, "Graded run finished");
        Ok(report)
    }

    fn classify(
        &self,
        expected_output: String,
        result: Result<ExecutionResult, SandboxError>,
    ) -> ReportEntry {
        let mut entry = ReportEntry::pending(expected_output);
        entry.status = EntryStatus::Failed;

        match result {
            Err(e) => {
                entry.error_kind = Some(ErrorKind::ExecutionFailed);
                entry.actual_output = Some(EXECUTION_ERROR_MARKER.to_string());
                entry.message = Some(e.to_string());
            }
            Ok(run) if run.is_error() => {
                entry.error_kind = Some(ErrorKind::RuntimeError);
                entry.exit_code = Some(run.exit_code);
                let stdout = run.stdout.trim();
                entry.message = Some(if run.stderr.trim().is_empty() && !stdout.is_empty() {
                    format!("Exit code: {}\n{}", run.exit_code, stdout)
                } else {
                    format!("Exit code: {}", run.exit_code)
                });
                entry.actual_output = Some(run.stderr);
            }
            Ok(run) => {
                entry.exit_code = Some(run.exit_code);
                if self.comparator.matches(&entry.expected_output, &run.stdout) {
                    entry.status = EntryStatus::Passed;
                } else {
                    entry.error_kind = Some(ErrorKind::OutputMismatch);
                }
                entry.actual_output = Some(run.stdout.trim().to_string());
            }
        }
        entry
    }
}

fn ensure_current(token: &AttemptToken) -> Result<(), Superseded> {
    if token.is_current() { Ok(()) } else { Err(Superseded) }
}

fn console_text(result: &ExecutionResult) -> String {
    if result.stdout.is_empty() && result.stderr.is_empty() {
        return if result.exit_code == 0 {
            "Code executed successfully with no output.".to_string()
        } else {
            format!("Exit code: {}", result.exit_code)
        };
    }

    let mut text = String::new();
    if !result.stdout.is_empty() {
        text.push_str("=== Output ===\n");
        text.push_str(&result.stdout);
    }
    if !result.stderr.is_empty() {
        text.push_str("\n=== Errors ===\n");
        text.push_str(&result.stderr);
    }
    if result.exit_code != 0 {
        text.push_str(&format!("\n\nExit code: {}", result.exit_code));
    }
    text
}
