use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid image name: {name}")]
    InvalidImageName { name: String },

    #[error("Docker image {image} not found. Please build it first.")]
    ImageNotFound { image: String },

    #[error("Container engine error ({operation}): {details}")]
    EngineError { operation: String, details: String },

    #[error("Invalid playbook path or filename: {path}")]
    InvalidPlaybookPath { path: String },

    #[error("Check '{check}' failed: {reason}")]
    CheckFailed { check: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Security,
    Environment,
    Assertion,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProbeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProbeError::ConfigValidationError { .. }
            | ProbeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ProbeError::InvalidImageName { .. } | ProbeError::InvalidPlaybookPath { .. } => {
                ErrorCategory::Security
            }
            ProbeError::ImageNotFound { .. } | ProbeError::EngineError { .. } => {
                ErrorCategory::Environment
            }
            ProbeError::CheckFailed { .. } => ErrorCategory::Assertion,
            ProbeError::IoError(_) | ProbeError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProbeError::CheckFailed { .. }
            | ProbeError::ConfigValidationError { .. }
            | ProbeError::InvalidConfigValueError { .. }
            | ProbeError::InvalidImageName { .. }
            | ProbeError::InvalidPlaybookPath { .. } => ErrorSeverity::High,
            ProbeError::EngineError { .. } => ErrorSeverity::Medium,
            ProbeError::ImageNotFound { .. }
            | ProbeError::IoError(_)
            | ProbeError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::InvalidImageName { name } => {
                format!("'{}' is not an acceptable image name", name)
            }
            ProbeError::ImageNotFound { image } => {
                format!("Image {} is not available locally", image)
            }
            ProbeError::EngineError { operation, .. } => {
                format!("The container engine failed during '{}'", operation)
            }
            ProbeError::InvalidPlaybookPath { .. } => {
                "The syntax-check playbook could not be mounted safely".to_string()
            }
            ProbeError::CheckFailed { check, .. } => format!("Check '{}' did not pass", check),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => {
                "Review the command-line flags and the TOML configuration file".to_string()
            }
            ErrorCategory::Security => match self {
                ProbeError::InvalidImageName { .. } => {
                    "Use only letters, digits, '.', '_', '-', '/' and an optional ':tag'".to_string()
                }
                _ => "Keep test_syntax_playbook.yml in the playbook directory and pass only its basename"
                    .to_string(),
            },
            ErrorCategory::Environment => match self {
                ProbeError::ImageNotFound { image } => {
                    format!("Build the image first, e.g. `docker build -t {} .`", image)
                }
                _ => "Make sure the docker CLI is installed and the daemon is running".to_string(),
            },
            ErrorCategory::Assertion => {
                "Inspect the check output with --verbose and rebuild the image".to_string()
            }
            ErrorCategory::System => "Check file permissions and available disk space".to_string(),
        }
    }

    /// 依嚴重程度決定 process exit code
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_not_found_is_critical() {
        let err = ProbeError::ImageNotFound {
            image: "ansible:test".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Environment);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Please build it first"));
        assert!(err.recovery_suggestion().contains("docker build -t ansible:test"));
    }

    #[test]
    fn test_invalid_image_name_is_security_error() {
        let err = ProbeError::InvalidImageName {
            name: "bad;rm".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Security);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("bad;rm"));
    }
}
