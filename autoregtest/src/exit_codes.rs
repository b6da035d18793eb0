//! Exit codes of the `autoregtest` binary.

/// The workflow ran to completion. The regression verdict itself is
/// reported by email, not through the exit code.
pub const OK: i32 = 0;
/// A configuration or execution error aborted the run.
pub const ERROR: i32 = 1;
