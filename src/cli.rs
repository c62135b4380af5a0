// src/cli.rs

//! CLI argument parsing for the `oprun` demo binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `oprun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "oprun",
    version,
    about = "Run a demo operation with live progress and simulated surface recreation.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a TOML config file with a `[runner]` section.
    ///
    /// Built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of steps the demo operation performs.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub steps: u32,

    /// Time spent on each step, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 200)]
    pub step_ms: u64,

    /// Replace the progress surface every N steps (0 disables it).
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub recreate_every: u32,

    /// Make the operation fail when it reaches this step.
    #[arg(long, value_name = "STEP")]
    pub fail_at: Option<u32>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `OPRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
