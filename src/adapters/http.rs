use crate::domain::model::{ApiResponse, ServicePage};
use crate::domain::ports::{BillingApi, ConfigProvider};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const SERVICES_PATH: &str = "/api/v1/system/services";

/// 以 Basic auth 存取計費系統 REST API 的用戶端
#[derive(Debug, Clone)]
pub struct HttpBillingApi {
    client: Client,
    base_uri: String,
    username: String,
    password: String,
}

impl HttpBillingApi {
    pub fn new(
        base_uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_uri: String = base_uri.into();

        Ok(Self {
            client,
            base_uri: base_uri.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_uri(),
            config.username(),
            config.password(),
            config.request_timeout(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_uri, path)
    }
}

#[async_trait]
impl BillingApi for HttpBillingApi {
    async fn list_services(&self, page: u32) -> Result<ServicePage> {
        let url = self.url(SERVICES_PATH);
        tracing::debug!("GET {}?page={}", url, page);

        let response = self
            .client
            .get(&url)
            .query(&[("page", page)])
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/json; charset=UTF8")
            .send()
            .await
            .map_err(|e| ImportError::RemoteUnavailable {
                message: format!("no response from {}: {}", url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::RemoteUnavailable {
                message: format!(
                    "service catalog request returned {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            });
        }

        let body = response.text().await?;
        let page: ServicePage = serde_json::from_str(&body)?;
        Ok(page)
    }

    async fn post_json<P>(&self, path: &str, body: &P) -> Result<ApiResponse>
    where
        P: Serialize + Send + Sync,
    {
        let url = self.url(path);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()
            .await
            .map_err(|e| ImportError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ImportError::Transport {
            message: e.to_string(),
        })?;

        tracing::debug!("POST {} -> {}", url, status);
        Ok(ApiResponse::new(status, body))
    }
}
