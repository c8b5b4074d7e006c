pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod output;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::HttpApiClient;
pub use config::{ResolvedConfig, SimulatorConfig};
pub use crate::core::{selection::SelectionController, simulator::Simulator};
pub use utils::error::{Result, SimError};
