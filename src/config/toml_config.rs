use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_REMOTE_NAME: &str = "Sonar";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "./log_output";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImporterConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// 失敗訊息中顯示的遠端系統名稱
    #[serde(default = "default_remote_name")]
    pub name: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

fn default_remote_name() -> String {
    DEFAULT_REMOTE_NAME.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_concurrent_requests() -> usize {
    DEFAULT_CONCURRENT_REQUESTS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            username: String::new(),
            password: String::new(),
            name: default_remote_name(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

impl ImporterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ImportError::Config {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PASSWORD})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ImporterConfig {
    fn validate(&self) -> Result<()> {
        validate_url("remote.uri", &self.remote.uri)?;
        validate_non_empty_string("remote.username", &self.remote.username)?;
        validate_non_empty_string("remote.password", &self.remote.password)?;
        validate_range("remote.timeout_seconds", self.remote.timeout_seconds, 1, 600)?;
        validate_path("import.output_dir", &self.import.output_dir)?;
        validate_range("import.concurrent_requests", self.import.concurrent_requests, 1, 100)?;
        Ok(())
    }
}

impl ConfigProvider for ImporterConfig {
    fn api_uri(&self) -> &str {
        &self.remote.uri
    }

    fn username(&self) -> &str {
        &self.remote.username
    }

    fn password(&self) -> &str {
        &self.remote.password
    }

    fn remote_name(&self) -> &str {
        &self.remote.name
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_seconds)
    }

    fn output_dir(&self) -> &Path {
        Path::new(&self.import.output_dir)
    }

    fn concurrent_requests(&self) -> usize {
        self.import.concurrent_requests
    }
}
