use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    ApiStatus { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MigrationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MigrationError::Http(_) => ErrorCategory::Network,
            MigrationError::ApiStatus { .. } => ErrorCategory::Backend,
            MigrationError::CsvError(_)
            | MigrationError::SerializationError(_)
            | MigrationError::ValidationError { .. }
            | MigrationError::ProcessingError { .. } => ErrorCategory::Data,
            MigrationError::ConfigError { .. }
            | MigrationError::ConfigValidationError { .. }
            | MigrationError::InvalidConfigValueError { .. }
            | MigrationError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MigrationError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MigrationError::ValidationError { .. } => ErrorSeverity::Low,
            MigrationError::Http(_) | MigrationError::ApiStatus { .. } => ErrorSeverity::Medium,
            MigrationError::CsvError(_)
            | MigrationError::SerializationError(_)
            | MigrationError::ProcessingError { .. }
            | MigrationError::ConfigError { .. }
            | MigrationError::ConfigValidationError { .. }
            | MigrationError::InvalidConfigValueError { .. }
            | MigrationError::MissingConfigError { .. } => ErrorSeverity::High,
            MigrationError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the migration backend is running and reachable from this machine"
            }
            ErrorCategory::Backend => "Inspect the migration backend logs for the failing endpoint",
            ErrorCategory::Data => "Verify the backend response format matches this client version",
            ErrorCategory::Configuration => {
                "Check --api-base-url, API_BASE_URL and the [api]/[console] sections of the TOML config"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MigrationError::Http(e) if e.is_timeout() => {
                "The migration backend did not answer in time".to_string()
            }
            MigrationError::Http(e) if e.is_connect() => {
                "Could not connect to the migration backend".to_string()
            }
            MigrationError::ApiStatus { status, url } => {
                format!("The migration backend rejected the request ({} {})", status, url)
            }
            MigrationError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_low_severity() {
        let err = MigrationError::ValidationError {
            message: "nothing selected".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_config_errors_point_at_configuration() {
        let err = MigrationError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: "ftp://host".to_string(),
            reason: "Unsupported URL scheme: ftp".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("API_BASE_URL"));
        assert!(err.user_friendly_message().contains("api.base_url"));
    }

    #[test]
    fn test_api_status_message() {
        let err = MigrationError::ApiStatus {
            status: 503,
            url: "http://localhost/api/health".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(
            err.user_friendly_message(),
            "The migration backend rejected the request (503 http://localhost/api/health)"
        );
    }
}
