use crate::utils::error::{ImportError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ImportError::MissingConfig {
            field: field_name.to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ImportError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::MissingConfig {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ImportError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("remote.uri", "https://billing.example.com").is_ok());
        assert!(validate_url("remote.uri", "http://localhost:8080").is_ok());
        assert!(validate_url("remote.uri", "").is_err());
        assert!(validate_url("remote.uri", "not a url").is_err());
        assert!(validate_url("remote.uri", "ftp://billing.example.com").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("import.output_dir", "./log_output").is_ok());
        assert!(validate_path("import.output_dir", "").is_err());
        assert!(validate_path("import.output_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("remote.username", "admin").is_ok());
        assert!(matches!(
            validate_non_empty_string("remote.username", "   "),
            Err(ImportError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("import.concurrent_requests", 10usize, 1, 100).is_ok());
        assert!(validate_range("import.concurrent_requests", 0usize, 1, 100).is_err());
        assert!(validate_range("remote.timeout_seconds", 601u64, 1, 600).is_err());
    }
}
