//! 將已驗證的資料列轉成 API 請求內容。
//!
//! 建構過程不會失敗：可選欄位若格式不正確（例如無法解析的日期）
//! 會直接略過，不視為錯誤。必要欄位已在驗證階段檢查過。

use crate::domain::model::ImportRow;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

const DEFAULT_OVERRIDE_REASON: &str = "Unknown";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePayload {
    pub service_id: i64,
    pub prorate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_override: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_override_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_bill_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPayload {
    #[serde(rename = "type")]
    pub method_type: &'static str,
    pub expiration_month: String,
    pub expiration_year: String,
    pub account_number: i64,
    pub name_on_account: String,
    pub auto: bool,
}

/// 帳戶服務：欄位 1 服務 ID、2 覆寫價格、3 覆寫原因、4 數量、5 下次帳單日
pub fn build_service_payload(row: &ImportRow) -> ServicePayload {
    let mut payload = ServicePayload {
        service_id: coerce_int(row.field(1)),
        prorate: false,
        price_override: None,
        price_override_reason: None,
        quantity: None,
        next_bill_date: None,
    };

    if !row.trimmed(2).is_empty() {
        payload.price_override = Some(coerce_float(row.field(2)));
        let reason = row.trimmed(3);
        payload.price_override_reason = Some(if reason.is_empty() {
            DEFAULT_OVERRIDE_REASON.to_string()
        } else {
            reason.to_string()
        });
    }

    let quantity = row.field(4);
    if is_numeric(quantity) && coerce_float(quantity) > 0.0 {
        payload.quantity = Some(coerce_int(quantity));
    }

    if !row.field(5).is_empty() {
        // 無法解析的日期直接略過
        payload.next_bill_date = normalize_date(row.field(5));
    }

    payload
}

/// 未代碼化信用卡：欄位 1 月、2 年、3 卡號、4 持卡人、5 自動扣款
pub fn build_card_payload(row: &ImportRow) -> CardPayload {
    CardPayload {
        method_type: "credit card",
        expiration_month: row.trimmed(1).to_string(),
        expiration_year: row.trimmed(2).to_string(),
        account_number: coerce_int(row.field(3)),
        name_on_account: row.trimmed(4).to_string(),
        auto: coerce_bool(row.field(5)),
    }
}

/// 去除空白後是否為有限數值
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.bytes().any(|b| b.is_ascii_digit())
        && trimmed.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// 數值字串取整數（向零截斷）；否則取開頭的數字，都沒有則為 0
pub fn coerce_int(value: &str) -> i64 {
    let trimmed = value.trim();
    if is_numeric(trimmed) {
        if let Ok(exact) = trimmed.parse::<i64>() {
            return exact;
        }
        return coerce_float(trimmed).trunc() as i64;
    }

    let prefix = numeric_prefix(trimmed, false);
    prefix.parse::<i64>().unwrap_or(0)
}

pub fn coerce_float(value: &str) -> f64 {
    let trimmed = value.trim();
    if is_numeric(trimmed) {
        return trimmed.parse::<f64>().unwrap_or(0.0);
    }

    numeric_prefix(trimmed, true).parse::<f64>().unwrap_or(0.0)
}

/// 空字串與 "0" 為 false，其餘皆為 true
pub fn coerce_bool(value: &str) -> bool {
    !(value.is_empty() || value == "0")
}

/// 將各種常見日期寫法正規化為 `YYYY-MM-DD`
pub fn normalize_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.date_naive().format("%Y-%m-%d").to_string());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        })
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn numeric_prefix(value: &str, allow_fraction: bool) -> &str {
    let bytes = value.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 {
            end = frac_end;
        }
    }

    if end == digits_start {
        return "";
    }

    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> ImportRow {
        ImportRow::new(fields.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_service_payload_minimal() {
        let payload = build_service_payload(&row(&["100", " 7 ", "", "", "", ""]));

        assert_eq!(payload.service_id, 7);
        assert!(!payload.prorate);
        assert_eq!(payload.price_override, None);
        assert_eq!(payload.price_override_reason, None);
        assert_eq!(payload.quantity, None);
        assert_eq!(payload.next_bill_date, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"service_id": 7, "prorate": false}));
    }

    #[test]
    fn test_service_payload_price_override_with_default_reason() {
        let payload = build_service_payload(&row(&["100", "7", " 19.95 ", "  "]));

        assert_eq!(payload.price_override, Some(19.95));
        assert_eq!(payload.price_override_reason.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_service_payload_price_override_with_reason() {
        let payload = build_service_payload(&row(&["100", "7", "5", " Loyalty discount "]));

        assert_eq!(payload.price_override, Some(5.0));
        assert_eq!(payload.price_override_reason.as_deref(), Some("Loyalty discount"));
    }

    #[test]
    fn test_service_payload_quantity_policy() {
        assert_eq!(build_service_payload(&row(&["1", "7", "", "", "3"])).quantity, Some(3));
        assert_eq!(build_service_payload(&row(&["1", "7", "", "", "2.7"])).quantity, Some(2));
        assert_eq!(build_service_payload(&row(&["1", "7", "", "", "0"])).quantity, None);
        assert_eq!(build_service_payload(&row(&["1", "7", "", "", "-4"])).quantity, None);
        assert_eq!(build_service_payload(&row(&["1", "7", "", "", "many"])).quantity, None);
        assert_eq!(build_service_payload(&row(&["1", "7", "", ""])).quantity, None);
    }

    #[test]
    fn test_service_payload_next_bill_date() {
        let payload = build_service_payload(&row(&["1", "7", "", "", "", "2024-03-01"]));
        assert_eq!(payload.next_bill_date.as_deref(), Some("2024-03-01"));

        let payload = build_service_payload(&row(&["1", "7", "", "", "", "03/15/2024"]));
        assert_eq!(payload.next_bill_date.as_deref(), Some("2024-03-15"));

        let payload = build_service_payload(&row(&["1", "7", "", "", "", "2024-03-01 10:30:00"]));
        assert_eq!(payload.next_bill_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_unparsable_date_is_omitted() {
        let payload = build_service_payload(&row(&["1", "7", "", "", "", "next tuesday-ish"]));
        assert_eq!(payload.next_bill_date, None);

        let payload = build_service_payload(&row(&["1", "7", "", "", "", "2024-13-45"]));
        assert_eq!(payload.next_bill_date, None);
    }

    #[test]
    fn test_card_payload() {
        let payload = build_card_payload(&row(&[
            "42",
            " 04 ",
            "2027",
            " 4111111111111111 ",
            " Jane Doe ",
            "1",
        ]));

        assert_eq!(payload.method_type, "credit card");
        assert_eq!(payload.expiration_month, "04");
        assert_eq!(payload.expiration_year, "2027");
        assert_eq!(payload.account_number, 4_111_111_111_111_111);
        assert_eq!(payload.name_on_account, "Jane Doe");
        assert!(payload.auto);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "credit card");
        assert_eq!(json["auto"], true);
    }

    #[test]
    fn test_coerce_bool() {
        assert!(!coerce_bool(""));
        assert!(!coerce_bool("0"));
        assert!(coerce_bool("1"));
        assert!(coerce_bool("false"));
        assert!(coerce_bool(" "));
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_int(" 15 "), 15);
        assert_eq!(coerce_int("12abc"), 12);
        assert_eq!(coerce_int("abc"), 0);
        assert_eq!(coerce_int("1e3"), 1000);
        assert_eq!(coerce_float("2.50"), 2.5);
        assert_eq!(coerce_float("3.5kg"), 3.5);
        assert_eq!(coerce_float(""), 0.0);
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("10"));
        assert!(is_numeric(" -2.5 "));
        assert!(is_numeric(".5"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("ten"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("NaN"));
        assert!(!is_numeric("$10"));
    }
}
