use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid file pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Malformed base64 payload in {}: {source}", .path.display())]
    MalformedPayload {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DecodeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DecodeError::IoError(_) => ErrorCategory::Io,
            DecodeError::PatternError(_)
            | DecodeError::ConfigValidationError { .. }
            | DecodeError::InvalidConfigValueError { .. }
            | DecodeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DecodeError::MalformedPayload { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DecodeError::IoError(_) => {
                "Check that the scan directory exists and is readable and writable"
            }
            DecodeError::PatternError(_) => "Use a file-name glob such as '*.png'",
            DecodeError::ConfigValidationError { .. } => {
                "Check the configuration file syntax and field names"
            }
            DecodeError::InvalidConfigValueError { .. } => {
                "Fix the reported value in the configuration or on the command line"
            }
            DecodeError::MissingConfigError { .. } => "Add the missing configuration field",
            DecodeError::MalformedPayload { .. } => {
                "Inspect the file manually, or rerun without --strict to skip it"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DecodeError::IoError(e) => format!("File system error: {}", e),
            DecodeError::PatternError(e) => format!("The file pattern is not a valid glob: {}", e),
            DecodeError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            DecodeError::InvalidConfigValueError { field, value, reason } => {
                format!("'{}' is not a valid value for {}: {}", value, field, reason)
            }
            DecodeError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            DecodeError::MalformedPayload { path, .. } => format!(
                "{} looks like base64 but could not be decoded; the pass was stopped",
                path.display()
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
