use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// 匯入檔中的一列，欄位依位置存取（沒有標題列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    fields: Vec<String>,
}

impl ImportRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// 原始欄位值；超出範圍的欄位視為空字串
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn trimmed(&self, index: usize) -> &str {
        self.field(index).trim()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&csv::StringRecord> for ImportRow {
    fn from(record: &csv::StringRecord) -> Self {
        Self::new(record.iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Recurring,
    Expiring,
    OneTime,
    #[serde(other)]
    Other,
}

impl ServiceType {
    /// 只有週期性與到期型服務可以掛到帳戶上
    pub fn is_eligible(self) -> bool {
        matches!(self, ServiceType::Recurring | ServiceType::Expiring)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCatalogEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub application: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePage {
    #[serde(default)]
    pub data: Vec<ServiceCatalogEntry>,
    pub paginator: Paginator,
}

/// 可匯入服務的查詢表，以服務 ID 為鍵
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    entries: HashMap<u64, ServiceCatalogEntry>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合併一頁資料，僅保留符合資格的服務類型
    pub(crate) fn merge_page(&mut self, page: ServicePage) {
        for entry in page.data {
            if entry.service_type.is_eligible() {
                self.entries.insert(entry.id, entry);
            }
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ServiceCatalogEntry> for ReferenceIndex {
    fn from_iter<I: IntoIterator<Item = ServiceCatalogEntry>>(iter: I) -> Self {
        let mut index = ReferenceIndex::new();
        index.merge_page(ServicePage {
            data: iter.into_iter().collect(),
            paginator: Paginator {
                current_page: 1,
                total_pages: 1,
            },
        });
        index
    }
}

/// 遠端 API 的原始回應
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 狀態碼 201 以下才算成功（202 以上一律視為失敗）
    pub fn is_accepted(&self) -> bool {
        self.status <= 201
    }

    /// 解析 `{"error":{"message":[...]}}`，多則訊息以逗號串接
    pub fn error_message(&self) -> String {
        match serde_json::from_str::<ErrorEnvelope>(&self.body) {
            Ok(envelope) => match envelope.error.message {
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(json_text)
                    .collect::<Vec<_>>()
                    .join(", "),
                serde_json::Value::Object(map) => {
                    map.values().map(json_text).collect::<Vec<_>>().join(", ")
                }
                other => json_text(&other),
            },
            Err(_) if self.body.trim().is_empty() => format!("HTTP {}", self.status),
            Err(_) => format!("HTTP {}: {}", self.status, self.body.trim()),
        }
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items.iter().map(json_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// 伺服器回傳非成功狀態與錯誤內容
    RemoteRejection { status: u16, message: String },
    /// 沒有收到回應（連線失敗、逾時等）
    Transport { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::RemoteRejection { message, .. } => f.write_str(message),
            FailureReason::Transport { message } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Success {
        row_number: usize,
        account_id: String,
    },
    Failure {
        row_number: usize,
        row: ImportRow,
        reason: FailureReason,
    },
}

/// 一次匯入的結果摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub successes: usize,
    pub failures: usize,
    pub failure_log_name: PathBuf,
    pub success_log_name: PathBuf,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.successes + self.failures
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// 固定寬度的並行請求池
    Pooled { concurrency: usize },
    /// 逐列同步送出
    Sequential,
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStrategy::Pooled { concurrency } => write!(f, "pooled({})", concurrency),
            DispatchStrategy::Sequential => f.write_str("sequential"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, service_type: ServiceType) -> ServiceCatalogEntry {
        ServiceCatalogEntry {
            id,
            service_type,
            application: Some("account".to_string()),
        }
    }

    #[test]
    fn test_import_row_missing_field_reads_empty() {
        let row = ImportRow::new(vec!["1".to_string(), " 12 ".to_string()]);
        assert_eq!(row.trimmed(1), "12");
        assert_eq!(row.field(5), "");
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_service_type_deserializes_unknown_as_other() {
        let page: ServicePage = serde_json::from_str(
            r#"{"data":[
                {"id":1,"type":"recurring","application":"account"},
                {"id":2,"type":"one_time","application":"account"},
                {"id":3,"type":"adjustment","application":"account"}
            ],"paginator":{"current_page":1,"total_pages":1}}"#,
        )
        .unwrap();

        assert_eq!(page.data[0].service_type, ServiceType::Recurring);
        assert_eq!(page.data[1].service_type, ServiceType::OneTime);
        assert_eq!(page.data[2].service_type, ServiceType::Other);
    }

    #[test]
    fn test_reference_index_keeps_only_eligible_types() {
        let index: ReferenceIndex = vec![
            entry(1, ServiceType::Recurring),
            entry(2, ServiceType::Expiring),
            entry(3, ServiceType::OneTime),
            entry(4, ServiceType::Other),
        ]
        .into_iter()
        .collect();

        assert_eq!(index.len(), 2);
        assert!(index.contains(1));
        assert!(index.contains(2));
        assert!(!index.contains(3));
        assert!(!index.contains(4));
    }

    #[test]
    fn test_error_message_joins_message_list() {
        let response = ApiResponse::new(422, r#"{"error":{"message":["invalid","missing price"]}}"#);
        assert!(!response.is_accepted());
        assert_eq!(response.error_message(), "invalid, missing price");
    }

    #[test]
    fn test_error_message_accepts_plain_string() {
        let response = ApiResponse::new(400, r#"{"error":{"message":"Account not found"}}"#);
        assert_eq!(response.error_message(), "Account not found");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(ApiResponse::new(502, "").error_message(), "HTTP 502");
        assert_eq!(
            ApiResponse::new(500, "Internal Server Error").error_message(),
            "HTTP 500: Internal Server Error"
        );
    }

    #[test]
    fn test_success_threshold_is_201() {
        assert!(ApiResponse::new(200, "").is_accepted());
        assert!(ApiResponse::new(201, "").is_accepted());
        assert!(!ApiResponse::new(202, "").is_accepted());
        assert!(!ApiResponse::new(204, "").is_accepted());
    }
}
