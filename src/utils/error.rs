use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Area code oracle unavailable: {message}")]
    OracleUnavailable { message: String },

    #[error("Unparseable oracle reply: {message}")]
    UnparseableReply { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

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

    #[error("Invalid postal code: '{value}'")]
    InvalidPostalCode { value: String },

    #[error("Invalid area code: '{value}'")]
    InvalidAreaCode { value: String },

    #[error("Invalid candidate input: {message}")]
    CandidateInputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Oracle,
    Network,
    Storage,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PickerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PickerError::OracleUnavailable { .. } | PickerError::UnparseableReply { .. } => {
                ErrorCategory::Oracle
            }
            PickerError::ApiError(_) => ErrorCategory::Network,
            PickerError::IoError(_) | PickerError::SerializationError(_) => ErrorCategory::Storage,
            PickerError::ConfigError { .. }
            | PickerError::ConfigValidationError { .. }
            | PickerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PickerError::InvalidPostalCode { .. }
            | PickerError::InvalidAreaCode { .. }
            | PickerError::CandidateInputError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 預言機失敗一律降級成空結果，只在直接呼叫 port 時才會看到
            ErrorCategory::Oracle => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PickerError::OracleUnavailable { .. } => {
                "Set OPENAI_API_KEY or pass --area-code to skip the lookup"
            }
            PickerError::UnparseableReply { .. } => {
                "Retry the lookup or provide the area code explicitly"
            }
            PickerError::ApiError(_) => "Check network connectivity and the oracle endpoint URL",
            PickerError::IoError(_) => "Check that the output path exists and is writable",
            PickerError::SerializationError(_) => "Check that the input file is valid JSON",
            PickerError::ConfigError { .. }
            | PickerError::ConfigValidationError { .. }
            | PickerError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
            PickerError::InvalidPostalCode { .. } => "Postal codes must be exactly 5 digits",
            PickerError::InvalidAreaCode { .. } => "Area codes must be exactly 3 digits",
            PickerError::CandidateInputError { .. } => {
                "Provide candidates as a JSON array of row strings or candidate objects"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PickerError::OracleUnavailable { .. } => {
                "Area code lookup service is not available".to_string()
            }
            PickerError::ApiError(_) => "Could not reach the area code lookup service".to_string(),
            PickerError::IoError(e) => format!("File operation failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_errors_are_low_severity() {
        let err = PickerError::OracleUnavailable {
            message: "missing key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Oracle);
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = PickerError::ConfigValidationError {
            field: "oracle.endpoint".to_string(),
            message: "must be a URL".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("oracle.endpoint"));
    }

    #[test]
    fn test_io_error_message() {
        let err = PickerError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("denied"));
    }
}
