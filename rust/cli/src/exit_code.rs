//! Process exit codes used by the CLI.

/// Command completed successfully.
pub const SUCCESS: i32 = 0;
/// Command failed (bad input, rejected action, I/O trouble).
pub const FAILURE: i32 = 2;
