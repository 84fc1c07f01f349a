use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedGuardError {
    #[error("API request failed: {0}")]
    ApiError(reqwest::Error),

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

    #[error("{service} returned HTTP {status}: {body}")]
    UpstreamError {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} returned no usable content")]
    EmptyResponseError { service: String },

    #[error("Extraction error: {message}")]
    ExtractionError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInputError { message: String },

    #[error("Service unavailable: {message}")]
    UnavailableError { message: String },
}

// URL 可能帶有查詢參數中的密鑰，包裝前一律移除
impl From<reqwest::Error> for MedGuardError {
    fn from(err: reqwest::Error) -> Self {
        MedGuardError::ApiError(err.without_url())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Upstream,
    Data,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MedGuardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MedGuardError::ApiError(_) => ErrorCategory::Network,
            MedGuardError::IoError(_) => ErrorCategory::System,
            MedGuardError::SerializationError(_) | MedGuardError::ExtractionError { .. } => {
                ErrorCategory::Data
            }
            MedGuardError::ConfigError { .. }
            | MedGuardError::ConfigValidationError { .. }
            | MedGuardError::InvalidConfigValueError { .. }
            | MedGuardError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MedGuardError::UpstreamError { .. }
            | MedGuardError::EmptyResponseError { .. }
            | MedGuardError::UnavailableError { .. } => ErrorCategory::Upstream,
            MedGuardError::InvalidInputError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息，不包含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            MedGuardError::ApiError(_) => {
                "Could not reach an external service. Please check the network connection."
                    .to_string()
            }
            MedGuardError::UpstreamError { service, .. } => {
                format!("The {} service could not process the request.", service)
            }
            MedGuardError::EmptyResponseError { service } => {
                format!("The {} service returned an empty answer.", service)
            }
            MedGuardError::InvalidInputError { message } => message.clone(),
            MedGuardError::UnavailableError { message } => message.clone(),
            MedGuardError::ExtractionError { .. } | MedGuardError::SerializationError(_) => {
                "The response could not be understood.".to_string()
            }
            MedGuardError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing.", field)
            }
            MedGuardError::ConfigError { .. }
            | MedGuardError::ConfigValidationError { .. }
            | MedGuardError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            MedGuardError::IoError(_) => "A local file could not be read or written.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check medguard.toml and the API key environment variables"
            }
            ErrorCategory::Network => "Check connectivity and try again",
            ErrorCategory::Upstream => "Verify the provider API key and model name, then retry",
            ErrorCategory::Data => "Retry the request; the provider answer was malformed",
            ErrorCategory::Input => "Correct the request body and resend",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, MedGuardError>;
