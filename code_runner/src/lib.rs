//! Program synthesis for the judged language and the sandbox that runs it.

pub mod program;
pub mod sandbox;

pub use sandbox::{ExecutionRequest, ExecutionResult, PistonSandbox, Sandbox, SandboxError};
