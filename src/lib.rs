//! Valgrind leak-check harness.
//!
//! Runs valgrind against a compiled test binary, echoes the diagnostic
//! stream line by line, and maps the result to a pass/fail exit code
//! suitable for CI.

pub mod cli;
pub mod command;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod report;
pub mod runner;
pub mod verdict;
