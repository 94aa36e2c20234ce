//! Valgrind leak-check harness CLI.
//!
//! `memcheck run` invokes valgrind against a compiled test binary, echoes
//! the diagnostic stream as `>> ` lines, and exits 0 only when the no-leaks
//! marker is present and the child exited 0.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use memcheck::{cli, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "memcheck",
    version,
    about = "Valgrind leak-check harness for compiled test binaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run valgrind against the target binary and report a pass/fail verdict.
    Run {
        /// Override the configured target binary name.
        target: Option<String>,
        /// Config file path.
        #[arg(long, default_value = "memcheck.toml")]
        config: PathBuf,
        /// Persist transcript and metadata under this directory.
        #[arg(long)]
        results: Option<PathBuf>,
    },
    /// Write a default `memcheck.toml` config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
        /// Config file path.
        #[arg(long, default_value = "memcheck.toml")]
        config: PathBuf,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            target,
            config,
            results,
        } => cli::run_check(&config, target.as_deref(), results.as_deref()),
        Command::Init { force, config } => {
            cli::init_config(&config, force)?;
            Ok(exit_codes::OK)
        }
    }
}
