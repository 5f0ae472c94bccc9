use util::problem_bank::Problem;

use super::{FUNCTION_NAME, InputShape, entry_block};

/// Starter code for `problem`, derived from its sample input.
///
/// The output only depends on the sample test case, so every client that
/// regenerates it for the same problem gets identical text.
pub fn generate(problem: &Problem) -> String {
    let shape = problem
        .sample_testcase
        .as_ref()
        .map(|sample| InputShape::of(&sample.input))
        .unwrap_or(InputShape::Missing);

    skeleton(&shape.parameters().join(", "), &shape.positional_args())
}

fn skeleton(params: &str, args: &str) -> String {
    format!(
        "def {FUNCTION_NAME}({params}):\n    # Write your code here\n    pass\n\n{}",
        entry_block(args)
    )
}
