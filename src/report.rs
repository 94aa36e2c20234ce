//! Optional run persistence.
//!
//! Writes the captured transcript and a metadata record to a results
//! directory for later inspection. The default run discards both once the
//! verdict is decided.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::CheckCommand;
use crate::runner::RunRecord;
use crate::verdict::Verdict;

/// Metadata for a check run, persisted to `meta.json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunMeta {
    pub target: String,
    pub shell_line: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub verdict: Verdict,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub transcript_bytes: usize,
}

/// Directory name for one run, derived from its start time.
pub fn run_id(started_at: DateTime<Utc>) -> String {
    format!("memcheck-{}", started_at.format("%Y%m%d_%H%M%S"))
}

/// Persist transcript and metadata under `<base_dir>/<run_id>/`.
pub fn capture_run(
    base_dir: &Path,
    command: &CheckCommand,
    record: &RunRecord,
    verdict: Verdict,
) -> Result<PathBuf> {
    let run_dir = base_dir.join(run_id(record.started_at));
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create results dir {}", run_dir.display()))?;

    let transcript_path = run_dir.join("transcript.log");
    fs::write(&transcript_path, &record.transcript)
        .with_context(|| format!("write {}", transcript_path.display()))?;

    let duration = record.finished_at - record.started_at;
    let meta = RunMeta {
        target: command.target().to_string(),
        shell_line: command.shell_line(),
        exit_code: record.exit_code,
        timed_out: record.timed_out,
        verdict,
        start_time: record.started_at.to_rfc3339(),
        end_time: record.finished_at.to_rfc3339(),
        duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        transcript_bytes: record.transcript.len(),
    };
    write_meta(&run_dir.join("meta.json"), &meta)?;

    debug!(run_dir = %run_dir.display(), "run captured");
    Ok(run_dir)
}

fn write_meta(path: &Path, meta: &RunMeta) -> Result<()> {
    let contents = serde_json::to_string_pretty(meta).context("serialize meta")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write meta {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemcheckConfig;
    use chrono::TimeZone;

    #[test]
    fn run_id_is_stable() {
        let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(run_id(started_at), "memcheck-20240301_123045");
    }

    #[test]
    fn captures_transcript_and_meta() {
        let temp = tempfile::tempdir().expect("tempdir");
        let command = CheckCommand::from_config(&MemcheckConfig::default());
        let record = RunRecord {
            transcript: "==1== HEAP SUMMARY\n".to_string(),
            exit_code: Some(1),
            timed_out: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        let run_dir =
            capture_run(temp.path(), &command, &record, Verdict::Fail).expect("capture");

        let transcript =
            fs::read_to_string(run_dir.join("transcript.log")).expect("read transcript");
        assert_eq!(transcript, "==1== HEAP SUMMARY\n");

        let meta: RunMeta = serde_json::from_str(
            &fs::read_to_string(run_dir.join("meta.json")).expect("read meta"),
        )
        .expect("parse meta");
        assert_eq!(meta.target, "test_benchmarking_h");
        assert_eq!(meta.exit_code, Some(1));
        assert_eq!(meta.verdict, Verdict::Fail);
        assert_eq!(meta.transcript_bytes, 19);
    }
}
