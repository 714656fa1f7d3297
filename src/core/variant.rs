use crate::core::payload::{build_card_payload, build_service_payload, CardPayload, ServicePayload};
use crate::core::validator::{check_price_override, check_service_exists};
use crate::domain::model::{DispatchStrategy, ImportRow, ReferenceIndex};
use crate::utils::error::Result;
use serde::Serialize;

/// 一種匯入類型的規則：必填欄位、語意檢查、請求內容與端點
pub trait ImportVariant: Send + Sync {
    type Payload: Serialize + Send + Sync;

    /// 用於錯誤訊息，例如 "account service"
    fn label(&self) -> &'static str;

    /// 結果日誌檔名前綴
    fn log_prefix(&self) -> &'static str;

    fn required_columns(&self) -> &'static [usize];

    /// 是否需要先載入遠端服務清單
    fn needs_reference_data(&self) -> bool {
        false
    }

    /// 必填欄位以外的檢查
    fn check_row(&self, _row: &ImportRow, _row_number: usize, _reference: &ReferenceIndex) -> Result<()> {
        Ok(())
    }

    fn build_payload(&self, row: &ImportRow) -> Self::Payload;

    fn endpoint(&self, account_id: i64) -> String;

    fn default_strategy(&self, concurrency: usize) -> DispatchStrategy;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccountServiceImport;

impl ImportVariant for AccountServiceImport {
    type Payload = ServicePayload;

    fn label(&self) -> &'static str {
        "account service"
    }

    fn log_prefix(&self) -> &'static str {
        "account_service_import"
    }

    fn required_columns(&self) -> &'static [usize] {
        &[0, 1]
    }

    fn needs_reference_data(&self) -> bool {
        true
    }

    fn check_row(&self, row: &ImportRow, row_number: usize, reference: &ReferenceIndex) -> Result<()> {
        check_service_exists(row, row_number, 1, reference)?;
        check_price_override(row, row_number, 2)
    }

    fn build_payload(&self, row: &ImportRow) -> ServicePayload {
        build_service_payload(row)
    }

    fn endpoint(&self, account_id: i64) -> String {
        format!("/api/v1/accounts/{}/services", account_id)
    }

    fn default_strategy(&self, concurrency: usize) -> DispatchStrategy {
        DispatchStrategy::Pooled { concurrency }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreditCardImport;

impl ImportVariant for CreditCardImport {
    type Payload = CardPayload;

    fn label(&self) -> &'static str {
        "untokenized credit card"
    }

    fn log_prefix(&self) -> &'static str {
        "untokenized_card_import"
    }

    fn required_columns(&self) -> &'static [usize] {
        &[0, 1, 2, 3, 4, 5]
    }

    fn build_payload(&self, row: &ImportRow) -> CardPayload {
        build_card_payload(row)
    }

    fn endpoint(&self, account_id: i64) -> String {
        format!("/api/v1/accounts/{}/payment_methods", account_id)
    }

    fn default_strategy(&self, _concurrency: usize) -> DispatchStrategy {
        DispatchStrategy::Sequential
    }
}
