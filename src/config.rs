//! Harness configuration stored in `memcheck.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Harness configuration (TOML).
///
/// Intended to be edited by humans. Missing fields (or a missing file) fall
/// back to the stock valgrind invocation the harness shipped with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemcheckConfig {
    /// Name of the compiled test binary, resolved relative to the working
    /// directory at run time.
    pub target: String,

    /// Bound on the wait for child exit after its diagnostic stream closes,
    /// in seconds. Unset means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout_secs: Option<u64>,

    pub valgrind: ValgrindConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValgrindConfig {
    /// Checker executable, resolved through the shell's search path.
    pub program: String,

    /// Flags passed between the program and the target path.
    pub flags: Vec<String>,
}

impl Default for ValgrindConfig {
    fn default() -> Self {
        Self {
            program: "valgrind".to_string(),
            flags: vec![
                "--leak-check=full".to_string(),
                "--show-leak-kinds=all".to_string(),
                "--track-fds=yes".to_string(),
            ],
        }
    }
}

impl Default for MemcheckConfig {
    fn default() -> Self {
        Self {
            target: "test_benchmarking_h".to_string(),
            wait_timeout_secs: None,
            valgrind: ValgrindConfig::default(),
        }
    }
}

impl MemcheckConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(anyhow!("target must be a non-empty binary name"));
        }
        if self.valgrind.program.trim().is_empty() {
            return Err(anyhow!("valgrind.program must be non-empty"));
        }
        if self.wait_timeout_secs == Some(0) {
            return Err(anyhow!("wait_timeout_secs must be > 0 when set"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MemcheckConfig::default()`.
pub fn load_config(path: &Path) -> Result<MemcheckConfig> {
    if !path.exists() {
        let cfg = MemcheckConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MemcheckConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &MemcheckConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension("toml.tmp");
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
