use crate::domain::model::{ApiResponse, ServicePage};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// 遠端計費系統的 API
///
/// `post_json` 只有在完全沒有收到回應時才回傳 `Err`；
/// 任何 HTTP 狀態碼都以 `ApiResponse` 交給呼叫端判斷。
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn list_services(&self, page: u32) -> Result<ServicePage>;

    async fn post_json<P>(&self, path: &str, body: &P) -> Result<ApiResponse>
    where
        P: Serialize + Send + Sync;
}

pub trait ConfigProvider: Send + Sync {
    fn api_uri(&self) -> &str;
    fn username(&self) -> &str;
    fn password(&self) -> &str;
    fn remote_name(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn output_dir(&self) -> &Path;
    fn concurrent_requests(&self) -> usize;
}
