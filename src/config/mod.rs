#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, ImportCommand, StrategyKind};
pub use toml_config::ImporterConfig;
