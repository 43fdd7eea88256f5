pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::RunMode;
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "provision")]
#[command(about = "Provision system packages and a Python environment, then run the assignment")]
pub struct CliConfig {
    /// Print activation instructions instead of running the assignment
    #[arg(long)]
    pub no_run: bool,

    /// Any other positional value keeps the default behaviour
    #[arg(value_name = "MODE", allow_hyphen_values = true, hide = true)]
    pub mode: Option<String>,

    /// TOML file overriding the built-in plan
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the venv and assignment paths are relative to (default: current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Show the commands each checkpoint would run without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Log process CPU and memory usage between checkpoints
    #[arg(long)]
    pub monitor: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn run_mode(&self) -> RunMode {
        if self.no_run {
            RunMode::NoRun
        } else {
            RunMode::from_arg(self.mode.as_deref())
        }
    }
}
