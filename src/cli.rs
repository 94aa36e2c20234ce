//! CLI command implementations.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::command::CheckCommand;
use crate::config::{MemcheckConfig, load_config, write_config};
use crate::exit_codes;
use crate::report::capture_run;
use crate::runner::run_check_command;
use crate::verdict::{Verdict, classify_verdict};

/// Run the leak check and map the verdict to an exit code.
pub fn run_check(
    config_path: &Path,
    target_override: Option<&str>,
    results_dir: Option<&Path>,
) -> Result<i32> {
    let mut cfg = load_config(config_path).context("load config")?;
    if let Some(target) = target_override {
        cfg.target = target.to_string();
        cfg.validate()?;
    }

    let command = CheckCommand::from_config(&cfg);
    println!("Running memcheck for {}", command.target());
    debug!(shell_line = %command.shell_line(), "invocation built");

    let wait_timeout = cfg.wait_timeout_secs.map(Duration::from_secs);
    let record = run_check_command(&command, wait_timeout)?;
    let verdict = classify_verdict(&record);
    info!(verdict = ?verdict, exit_code = ?record.exit_code, "check complete");

    if let Some(dir) = results_dir {
        let run_dir = capture_run(dir, &command, &record, verdict).context("capture run")?;
        debug!(run_dir = %run_dir.display(), "results written");
    }

    match verdict {
        Verdict::Pass => Ok(exit_codes::OK),
        Verdict::Fail => {
            println!("Tests failed");
            Ok(exit_codes::FAILED)
        }
    }
}

/// Write the default config file.
pub fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if !force && config_path.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &MemcheckConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(())
}
