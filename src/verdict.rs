//! Pass/fail classification for a completed check run.

use serde::{Deserialize, Serialize};

use crate::runner::RunRecord;

/// Text valgrind prints when no leaks were detected.
///
/// Substring search over free-form diagnostic output is the only correctness
/// signal the harness has, so the check lives behind [`marker_present`]; if a
/// valgrind release rewords the summary, only this constant changes.
pub const NO_LEAKS_MARKER: &str = "All heap blocks were freed -- no leaks are possible";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Whether the no-leaks marker appears anywhere in the captured stream.
pub fn marker_present(transcript: &str) -> bool {
    transcript.contains(NO_LEAKS_MARKER)
}

/// Pass iff the child exited 0 (without timing out) and the marker is
/// present. Everything else, including a marker paired with a non-zero exit,
/// is a failure.
pub fn classify_verdict(record: &RunRecord) -> Verdict {
    if !record.timed_out && record.exit_code == Some(0) && marker_present(&record.transcript) {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}
