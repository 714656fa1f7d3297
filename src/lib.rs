pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::HttpBillingApi;
pub use crate::config::ImporterConfig;
pub use crate::core::{
    engine::{BatchImportEngine, EngineSettings},
    reference::ReferenceDataCache,
    result_log::ResultLog,
    validator::RowValidator,
    variant::{AccountServiceImport, CreditCardImport, ImportVariant},
};
pub use crate::domain::model::{DispatchStrategy, ImportSummary};
pub use crate::utils::error::{ImportError, Result};
