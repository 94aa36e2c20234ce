//! Child process execution and diagnostic stream capture.
//!
//! Spawns the check command, echoes its stderr line by line, and records the
//! transcript plus exit status for verdict classification.

use std::io::{BufRead, BufReader};
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use wait_timeout::ChildExt;

use crate::command::CheckCommand;

/// Everything observed from one check run.
#[derive(Debug)]
pub struct RunRecord {
    /// Concatenation of all captured diagnostic lines, newline-terminated.
    pub transcript: String,
    pub exit_code: Option<i32>,
    /// True when the post-stream wait exceeded the configured bound.
    pub timed_out: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Run the check command to completion.
///
/// Echoes each diagnostic line to stdout as `>> <line>` while accumulating
/// the raw transcript. Blocks until the stream reaches end-of-file, then
/// waits for the child to exit (bounded by `wait_timeout` when given) so the
/// exit status is available before the verdict is computed.
#[instrument(skip_all, fields(target = %command.target()))]
pub fn run_check_command(
    command: &CheckCommand,
    wait_timeout: Option<Duration>,
) -> Result<RunRecord> {
    let started_at = Utc::now();
    let mut child = command
        .to_command()
        .spawn()
        .with_context(|| format!("spawn `{}`", command.shell_line()))?;

    let stderr = child
        .stderr
        .take()
        .context("capture child diagnostic stream")?;

    let mut transcript = String::new();
    for line in BufReader::new(stderr).lines() {
        let line = line.context("read diagnostic line")?;
        println!(">> {line}");
        transcript.push_str(&line);
        transcript.push('\n');
    }

    let mut timed_out = false;
    let status: Option<ExitStatus> = match wait_timeout {
        Some(limit) => match child.wait_timeout(limit).context("wait for child")? {
            Some(status) => Some(status),
            None => {
                timed_out = true;
                child.kill().ok();
                child.wait().context("wait after kill")?;
                None
            }
        },
        None => Some(child.wait().context("wait for child")?),
    };

    let exit_code = status.and_then(|status| status.code());
    let finished_at = Utc::now();
    debug!(
        exit_code = ?exit_code,
        timed_out,
        transcript_bytes = transcript.len(),
        "check run finished"
    );

    Ok(RunRecord {
        transcript,
        exit_code,
        timed_out,
        started_at,
        finished_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemcheckConfig;

    /// Stand-in check that runs `script` under `sh -c` instead of valgrind.
    /// The trailing `./unused` argument becomes the script's `$0` and is
    /// ignored. The `exec` prefix replaces the wrapper shell spawned by
    /// `to_command`, so it does not linger holding the stderr pipe open —
    /// otherwise scripts that close fd 2 would never produce EOF.
    fn shell_command(script: &str) -> CheckCommand {
        let mut cfg = MemcheckConfig::default();
        cfg.valgrind.program = "exec sh".to_string();
        cfg.valgrind.flags = vec!["-c".to_string(), format!("'{script}'")];
        cfg.target = "unused".to_string();
        CheckCommand::from_config(&cfg)
    }

    #[test]
    fn captures_transcript_in_order() {
        let command = shell_command("echo first >&2; echo second >&2; exit 0");
        let record = run_check_command(&command, None).expect("run");
        assert_eq!(record.transcript, "first\nsecond\n");
        assert_eq!(record.exit_code, Some(0));
        assert!(!record.timed_out);
    }

    #[test]
    fn records_nonzero_exit() {
        let command = shell_command("echo definitely lost >&2; exit 1");
        let record = run_check_command(&command, None).expect("run");
        assert_eq!(record.exit_code, Some(1));
    }

    #[test]
    fn empty_stream_yields_empty_transcript() {
        let command = shell_command("exit 0");
        let record = run_check_command(&command, None).expect("run");
        assert_eq!(record.transcript, "");
        assert_eq!(record.exit_code, Some(0));
    }

    #[test]
    fn missing_target_is_not_a_clean_exit() {
        // The shell reports the missing binary on stderr and exits 127.
        let command = shell_command("./no_such_binary_here");
        let record = run_check_command(&command, None).expect("run");
        assert_ne!(record.exit_code, Some(0));
        assert!(!record.transcript.is_empty());
    }

    #[test]
    fn post_stream_wait_times_out() {
        // Close stderr so the read loop ends, then outlive the wait bound.
        let command = shell_command("exec 2>&-; sleep 2");
        let record =
            run_check_command(&command, Some(Duration::from_millis(200))).expect("run");
        assert!(record.timed_out);
        assert_eq!(record.exit_code, None);
    }
}
