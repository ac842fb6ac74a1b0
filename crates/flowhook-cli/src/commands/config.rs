//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use flowhook_core::config::AppConfig;
use flowhook_core::error::AppError;

use crate::output::{self, OutputFormat};

const DEFAULT_CONFIG: &str = include_str!("../../../../config/default.toml");

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(config),
            OutputFormat::Table => {
                println!("[host]");
                output::print_kv(
                    "hook_timeout_seconds",
                    &config.host.hook_timeout_seconds.to_string(),
                );
                output::print_kv("max_job_depth", &config.host.max_job_depth.to_string());
                output::print_kv(
                    "skip_aggregation",
                    &config.host.skip_aggregation.to_string(),
                );
                output::print_kv("max_page_size", &config.host.max_page_size.to_string());
                println!("[logging]");
                output::print_kv("level", &config.logging.level);
                output::print_kv("format", &config.logging.format);
            }
        },
        ConfigCommand::Validate => {
            config.validate()?;
            output::print_success(&format!("Configuration '{}' is valid", config_path));
            if config.host.skip_aggregation {
                output::print_warning("skip_aggregation is set; postAggregate will never run");
            }
        }
        ConfigCommand::Generate { output: out_path } => {
            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, DEFAULT_CONFIG).await?;
            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}
