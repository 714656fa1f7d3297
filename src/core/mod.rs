pub mod engine;
pub mod payload;
pub mod reference;
pub mod result_log;
pub mod validator;
pub mod variant;

pub use crate::domain::model::{ImportOutcome, ImportRow, ImportSummary, ReferenceIndex};
pub use crate::domain::ports::{BillingApi, ConfigProvider};
pub use crate::utils::error::Result;
