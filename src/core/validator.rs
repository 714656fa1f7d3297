use crate::core::payload::is_numeric;
use crate::core::variant::ImportVariant;
use crate::domain::model::{ImportRow, ReferenceIndex};
use crate::utils::error::{ImportError, Result};

/// 匯入前的整檔檢查，遇到第一個錯誤即停止
///
/// 列號從 1 開始，欄號在訊息中也以 1 起算。
pub struct RowValidator<'a, V: ImportVariant> {
    variant: &'a V,
}

impl<'a, V: ImportVariant> RowValidator<'a, V> {
    pub fn new(variant: &'a V) -> Self {
        Self { variant }
    }

    /// 只檢查必填欄位，不需要遠端參考資料
    pub fn check_required(&self, rows: &[ImportRow]) -> Result<()> {
        for (index, row) in rows.iter().enumerate() {
            self.check_required_row(row, index + 1)?;
        }
        Ok(())
    }

    /// 完整驗證：每列依欄位順序先檢查必填，再檢查語意規則
    pub fn validate(&self, rows: &[ImportRow], reference: &ReferenceIndex) -> Result<()> {
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            self.check_required_row(row, row_number)?;
            self.variant.check_row(row, row_number, reference)?;
        }

        tracing::debug!("Validated {} {} rows", rows.len(), self.variant.label());
        Ok(())
    }

    fn check_required_row(&self, row: &ImportRow, row_number: usize) -> Result<()> {
        for &column in self.variant.required_columns() {
            if row.trimmed(column).is_empty() {
                return Err(ImportError::validation(
                    row_number,
                    Some(column),
                    format!(
                        "In the {} import, column number {} is required, and it is empty on row {}.",
                        self.variant.label(),
                        column + 1,
                        row_number
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// 服務 ID 必須存在於可匯入服務清單中
pub fn check_service_exists(
    row: &ImportRow,
    row_number: usize,
    column: usize,
    reference: &ReferenceIndex,
) -> Result<()> {
    let raw = row.trimmed(column);
    let known = raw.parse::<u64>().map(|id| reference.contains(id)).unwrap_or(false);

    if !known {
        return Err(ImportError::validation(
            row_number,
            Some(column),
            format!("Service ID {} is not a recurring or expiring service.", raw),
        ));
    }
    Ok(())
}

pub fn check_price_override(row: &ImportRow, row_number: usize, column: usize) -> Result<()> {
    let value = row.trimmed(column);
    if !value.is_empty() && !is_numeric(value) {
        return Err(ImportError::validation(
            row_number,
            Some(column),
            format!("Price override on row {} is not numeric.", row_number),
        ));
    }
    Ok(())
}
