//! The fixed invocation the harness runs.

use std::process::{Command, Stdio};

use crate::config::MemcheckConfig;

/// Immutable description of one leak-check invocation.
///
/// Built once from config at startup. The target binary is expected in the
/// working directory; the harness does not build or locate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCommand {
    program: String,
    flags: Vec<String>,
    target: String,
}

impl CheckCommand {
    pub fn from_config(cfg: &MemcheckConfig) -> Self {
        Self {
            program: cfg.valgrind.program.clone(),
            flags: cfg.valgrind.flags.clone(),
            target: cfg.target.clone(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Render the invocation as a single shell line, e.g.
    /// `valgrind --leak-check=full ./test_benchmarking_h`.
    pub fn shell_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.flags.len() + 2);
        parts.push(self.program.clone());
        parts.extend(self.flags.iter().cloned());
        parts.push(format!("./{}", self.target));
        parts.join(" ")
    }

    /// Build the child process: shell-mediated, stdin open for writing
    /// (unused), stdout discarded, stderr captured for the read loop.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(self.shell_line())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}
