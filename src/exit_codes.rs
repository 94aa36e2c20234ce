//! Stable exit codes for the memcheck CLI.

/// Marker present and the child exited 0.
pub const OK: i32 = 0;
/// Failing verdict, or any error launching or reading the check.
pub const FAILED: i32 = 1;
