use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File could not be opened: {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Validation {
        row: usize,
        column: Option<usize>,
        message: String,
    },

    #[error("Remote system unavailable: {message}")]
    RemoteUnavailable { message: String },

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn validation(row: usize, column: Option<usize>, message: impl Into<String>) -> Self {
        ImportError::Validation {
            row,
            column,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ImportError::Transport { .. } => ErrorSeverity::Low,
            ImportError::RemoteUnavailable { .. } | ImportError::Http(_) => ErrorSeverity::Medium,
            ImportError::FileAccess { .. }
            | ImportError::Validation { .. }
            | ImportError::Csv(_)
            | ImportError::Serialization(_) => ErrorSeverity::High,
            ImportError::Io(_)
            | ImportError::Config { .. }
            | ImportError::InvalidConfigValue { .. }
            | ImportError::MissingConfig { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::FileAccess { .. } => "Check that the import file exists and is readable.",
            ImportError::Validation { .. } => {
                "Fix the reported row and column in the import file, then run the import again."
            }
            ImportError::RemoteUnavailable { .. } | ImportError::Http(_) => {
                "Check the API URI and credentials, and that the billing system is reachable."
            }
            ImportError::Transport { .. } => "Retry the failed rows from the failure log.",
            ImportError::Csv(_) => "Make sure the import file is comma separated UTF-8 text.",
            ImportError::Io(_) => "Check permissions and free space in the output directory.",
            ImportError::Serialization(_) => "The remote system returned an unexpected payload.",
            ImportError::Config { .. }
            | ImportError::InvalidConfigValue { .. }
            | ImportError::MissingConfig { .. } => {
                "Review the configuration file, command line flags and .env values."
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::Validation { message, .. } => format!("Import file rejected: {}", message),
            ImportError::FileAccess { path, .. } => format!("Import file could not be opened: {}", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
