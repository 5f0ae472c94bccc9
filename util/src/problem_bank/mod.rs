//! Read-only problem catalog.
//!
//! The catalog is a JSON document shaped as `{ "questions": [ ... ] }` and is
//! loaded once at startup. Each problem carries a sample test case (used to seed
//! the editor) and an ordered list of hidden test cases (used for grading).
//! Test-case inputs are kept as raw JSON values so record inputs retain their
//! declared key order.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum ProblemBankError {
    #[error("Failed to read problem bank at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid problem bank JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Problem bank contains no problems")]
    Empty,
    #[error("Duplicate problem id {0}")]
    DuplicateId(i64),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TestCase {
    pub input: Value,
    pub output: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "statement")]
    pub description: String,
    #[serde(default)]
    pub input_format: String,
    #[serde(default)]
    pub output_format: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub sample_testcase: Option<TestCase>,
    #[serde(default)]
    pub testcases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct BankFile {
    questions: Vec<Problem>,
}

/// The loaded catalog. Problems keep the order they were declared in.
#[derive(Debug, Clone)]
pub struct ProblemBank {
    problems: Vec<Problem>,
}

impl ProblemBank {
    /// Builds a bank from already-parsed problems, rejecting empty or
    /// duplicate-id catalogs.
    pub fn new(problems: Vec<Problem>) -> Result<Self, ProblemBankError> {
        if problems.is_empty() {
            return Err(ProblemBankError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for p in &problems {
            if !seen.insert(p.id) {
                return Err(ProblemBankError::DuplicateId(p.id));
            }
            if p.testcases.is_empty() {
                tracing::warn!(problem_id = p.id, "Problem has no hidden test cases");
            }
        }
        Ok(Self { problems })
    }

    pub fn from_json(raw: &str) -> Result<Self, ProblemBankError> {
        let file: BankFile = serde_json::from_str(raw)?;
        Self::new(file.questions)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProblemBankError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ProblemBankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bank = Self::from_json(&raw)?;
        tracing::info!(count = bank.len(), path = %path.display(), "Loaded problem bank");
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }

    pub fn all(&self) -> &[Problem] {
        &self.problems
    }

    /// Picks one problem uniformly at random from the whole catalog.
    pub fn pick_random(&self) -> &Problem {
        // `new` guarantees at least one problem.
        self.problems
            .choose(&mut rand::rng())
            .unwrap_or(&self.problems[0])
    }
}
