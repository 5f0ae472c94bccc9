//! Turns an authored solution into one runnable program per test case.
//!
//! The solution is split once at its entry guard; each test case only
//! swaps in a new entry block with different bound arguments.

use serde_json::Value;

use super::{InputShape, entry_block};

/// A solution with its entry block removed, ready to be bound to inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSolution {
    prelude: String,
}

impl PreparedSolution {
    /// Cuts `solution_text` at the first column-0 entry guard. Text without a
    /// guard is kept whole and the entry block is appended.
    pub fn new(solution_text: &str) -> Self {
        let cut = guard_offset(solution_text).unwrap_or(solution_text.len());
        Self {
            prelude: solution_text[..cut].trim_end().to_owned(),
        }
    }

    pub fn prelude(&self) -> &str {
        &self.prelude
    }

    /// Full program calling `solution` with `input`. Record inputs are passed
    /// as keyword arguments.
    pub fn program_for(&self, input: &Value) -> String {
        let block = entry_block(&InputShape::of(input).keyword_args());
        if self.prelude.is_empty() {
            block
        } else {
            format!("{}\n\n{}", self.prelude, block)
        }
    }
}

/// One-shot form of [`PreparedSolution::program_for`].
pub fn compile_for_testcase(solution_text: &str, input: &Value) -> String {
    PreparedSolution::new(solution_text).program_for(input)
}

fn guard_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if is_entry_guard(line) {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

fn is_entry_guard(line: &str) -> bool {
    if !line.starts_with("if") {
        return false;
    }
    let code = line.split('#').next().unwrap_or_default();
    let compact: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    compact == "if__name__==\"__main__\":" || compact == "if__name__=='__main__':"
}
