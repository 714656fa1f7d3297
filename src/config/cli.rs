use crate::config::toml_config::ImporterConfig;
use crate::domain::model::DispatchStrategy;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "billing-import")]
#[command(about = "Bulk import account services and credit cards into the billing system")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "URI", help = "Base URI of the billing API")]
    pub uri: Option<String>,

    #[arg(long, env = "USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, help = "Directory for the success and failure logs")]
    pub output_dir: Option<String>,

    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, value_enum, help = "Override the default dispatch strategy")]
    pub strategy: Option<StrategyKind>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: ImportCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ImportCommand {
    /// Attach recurring or expiring services to accounts
    Services { file: PathBuf },
    /// Add untokenized credit cards as payment methods
    Cards { file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    Pooled,
    Sequential,
}

impl CliConfig {
    /// 合併設定檔與命令列參數（命令列優先），並驗證結果
    pub fn resolve(&self) -> Result<ImporterConfig> {
        let mut config = match &self.config {
            Some(path) => ImporterConfig::from_file(path)?,
            None => ImporterConfig::default(),
        };

        if let Some(uri) = &self.uri {
            config.remote.uri = uri.clone();
        }
        if let Some(username) = &self.username {
            config.remote.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.remote.password = password.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.import.output_dir = output_dir.clone();
        }
        if let Some(concurrent) = self.concurrent_requests {
            config.import.concurrent_requests = concurrent;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.remote.timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn strategy_override(&self, concurrency: usize) -> Option<DispatchStrategy> {
        self.strategy.map(|kind| match kind {
            StrategyKind::Pooled => DispatchStrategy::Pooled { concurrency },
            StrategyKind::Sequential => DispatchStrategy::Sequential,
        })
    }
}
