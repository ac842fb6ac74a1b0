//! CLI command definitions and dispatch.

pub mod check;
pub mod config;
pub mod hooks;

use clap::{Parser, Subcommand};

use flowhook_core::config::AppConfig;
use flowhook_core::error::AppError;

use crate::output::OutputFormat;

/// Flowhook: typed hook contracts for integration-flow scripts
#[derive(Debug, Parser)]
#[command(name = "flowhook", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the hook catalog
    Hooks(hooks::HooksArgs),
    /// Replay a recorded hook call through the host-side contract checks
    Check(check::CheckArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, app_config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Hooks(args) => hooks::execute(args, self.format),
            Commands::Check(args) => check::execute(args, app_config, self.format).await,
            Commands::Config(args) => {
                config::execute(args, &self.config, app_config, self.format).await
            }
        }
    }
}

/// Helper: load configuration from file and environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}
