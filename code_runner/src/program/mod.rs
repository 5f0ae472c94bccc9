//! Python program synthesis for the judged language.
//!
//! Every program is a `solution` function followed by an entry block guarded
//! by `if __name__ == "__main__":` that calls it and prints the result. How
//! the call is built depends on the shape of the test-case input.

pub mod boilerplate;
pub mod compiler;
pub mod literal;

use serde_json::Value;

pub use boilerplate::generate;
pub use compiler::{PreparedSolution, compile_for_testcase};
pub use literal::python_literal;

pub const ENTRY_GUARD: &str = "if __name__ == \"__main__\":";
pub const FUNCTION_NAME: &str = "solution";

/// Shape of a test-case input, which decides the parameter list and the call.
#[derive(Debug, Clone, PartialEq)]
pub enum InputShape<'a> {
    /// Named parameters in declared order.
    Record(Vec<(&'a str, &'a Value)>),
    Sequence(&'a Value),
    Text(&'a Value),
    Scalar(&'a Value),
    /// `null`; no usable shape.
    Missing,
}

impl<'a> InputShape<'a> {
    pub fn of(input: &'a Value) -> Self {
        match input {
            Value::Object(map) => InputShape::Record(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Value::Array(_) => InputShape::Sequence(input),
            Value::String(_) => InputShape::Text(input),
            Value::Number(_) | Value::Bool(_) => InputShape::Scalar(input),
            Value::Null => InputShape::Missing,
        }
    }

    /// Parameter names for the generated signature.
    pub fn parameters(&self) -> Vec<&'a str> {
        match self {
            InputShape::Record(fields) => fields.iter().map(|(k, _)| *k).collect(),
            InputShape::Sequence(_) => vec!["nums"],
            InputShape::Text(_) => vec!["s"],
            InputShape::Scalar(_) => vec!["n"],
            InputShape::Missing => vec![],
        }
    }

    /// Positional argument list, e.g. `[1, 2, 3], 4`.
    pub fn positional_args(&self) -> String {
        match self {
            InputShape::Record(fields) => fields
                .iter()
                .map(|(_, v)| python_literal(v))
                .collect::<Vec<_>>()
                .join(", "),
            InputShape::Sequence(v) | InputShape::Text(v) | InputShape::Scalar(v) => python_literal(v),
            InputShape::Missing => String::new(),
        }
    }

    /// Keyword argument list for records (`nums=[1, 2], target=3`); the
    /// positional form for everything else.
    pub fn keyword_args(&self) -> String {
        match self {
            InputShape::Record(fields) => fields
                .iter()
                .map(|(k, v)| format!("{k}={}", python_literal(v)))
                .collect::<Vec<_>>()
                .join(", "),
            _ => self.positional_args(),
        }
    }
}

/// Entry block that calls `solution(args)` and prints the result.
pub(crate) fn entry_block(args: &str) -> String {
    format!("{ENTRY_GUARD}\n    result = {FUNCTION_NAME}({args})\n    print(result)\n")
}
