//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for workforce results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plan, per-task outcomes, arbitration and the final answer
    Full,
    /// Only the final answer
    Answer,
    /// JSON output
    Json,
}

/// CLI arguments for legal-workforce
#[derive(Parser, Debug)]
#[command(name = "legal-workforce")]
#[command(author, version, about = "Legal workforce - a team of specialist agents works your legal question")]
#[command(long_about = r#"
Legal workforce decomposes a legal request into a plan of specialist tasks,
runs them in dependency order and reconciles disagreements into one answer.

The process has four steps:
1. Requirement check: incomplete requests get clarifying questions instead
2. Planning: the request becomes a DAG of tasks for specialist roles
3. Execution: tasks run wave by wave with bounded concurrency
4. Arbitration: conflicting specialist conclusions are scored and resolved

Configuration files are loaded from (in priority order):
1. WORKFORCE_* environment variables
2. --config <path>     Explicit config file
3. ./workforce.toml    Project-level config
4. ~/.config/legal-workforce/config.toml   Global config

Example:
  legal-workforce "Review the termination clause of my office lease; the landlord wants 6 months notice"
  legal-workforce --output answer --rating 5 "Draft a reply to a late-payment notice"
"#)]
pub struct Cli {
    /// The legal request to work on
    pub task: Option<String>,

    /// The request refers to attached documents
    #[arg(long)]
    pub attachments: bool,

    /// Skip the requirement completeness check
    #[arg(long)]
    pub skip_check: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Rate the answer (1-5); stored with the episode
    #[arg(long, value_name = "1-5", value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: Option<u8>,

    /// Comment stored alongside --rating
    #[arg(long, requires = "rating")]
    pub comment: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append structured execution events (JSONL) to this file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,
}
