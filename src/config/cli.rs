use crate::config::toml_config::ConfigOverrides;
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "plusvalia")]
#[command(about = "Real-estate appreciation simulator client")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL; only PLUSVALIA_API_BASE_URL takes precedence
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List available projects
    Projects,
    /// List the units of a project (first project by default)
    Units {
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Run a valuation for a project, unit and horizon
    Simulate {
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        unit: Option<i64>,
        /// Horizon in years; values above 10 are truncated to 10
        #[arg(short, long, allow_negative_numbers = true)]
        years: Option<i32>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Check backend health
    Health,
    /// Show the resolved configuration or write a template
    Config {
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

impl CliConfig {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_base: self.api_base.clone(),
        }
    }
}
