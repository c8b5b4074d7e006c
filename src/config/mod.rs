pub mod api_base;
#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use api_base::{ApiBase, BaseUrlSources, Environment};
pub use toml_config::{ConfigOverrides, ResolvedConfig, SimulatorConfig};
