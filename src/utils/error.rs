use thiserror::Error;

#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Country '{country}' not found")]
    NotFound { country: String },

    #[error("Invalid currency code: '{code}'")]
    InvalidCode { code: String },

    #[error("Missing credential: {name} is not set")]
    MissingCredential { name: String },

    #[error("Exchange rate not available for {code}")]
    RateUnavailable { code: String },

    #[error("Rate source unreachable: {message}")]
    SourceUnreachable {
        message: String,
        payload: Option<serde_json::Value>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Configuration,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TravelError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::SourceUnreachable {
            message: message.into(),
            payload: None,
        }
    }

    /// Copy of this error for callers that waited on the same attempt.
    /// IO and serialization errors carry no clonable source, so they come back
    /// as `SourceUnreachable` with the original text.
    pub fn duplicate(&self) -> Self {
        match self {
            Self::NotFound { country } => Self::NotFound {
                country: country.clone(),
            },
            Self::InvalidCode { code } => Self::InvalidCode { code: code.clone() },
            Self::MissingCredential { name } => Self::MissingCredential { name: name.clone() },
            Self::RateUnavailable { code } => Self::RateUnavailable { code: code.clone() },
            Self::SourceUnreachable { message, payload } => Self::SourceUnreachable {
                message: message.clone(),
                payload: payload.clone(),
            },
            Self::IoError(e) => Self::unreachable(e.to_string()),
            Self::SerializationError(e) => Self::unreachable(e.to_string()),
            Self::ConfigError { message } => Self::ConfigError {
                message: message.clone(),
            },
            Self::InvalidConfigValueError {
                field,
                value,
                reason,
            } => Self::InvalidConfigValueError {
                field: field.clone(),
                value: value.clone(),
                reason: reason.clone(),
            },
            Self::MissingConfigError { field } => Self::MissingConfigError {
                field: field.clone(),
            },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::Input,
            Self::InvalidCode { .. } | Self::RateUnavailable { .. } => ErrorCategory::Data,
            Self::SourceUnreachable { .. } => ErrorCategory::Network,
            Self::MissingCredential { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data if matches!(self, Self::RateUnavailable { .. }) => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Input | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Only transient provider failures qualify for the single bounded retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnreachable { .. })
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::NotFound { country } => format!(
                "Check the spelling of '{}' or add it under [directory.entries]",
                country
            ),
            Self::InvalidCode { .. } => {
                "Currency codes must be three uppercase letters, e.g. USD".to_string()
            }
            Self::MissingCredential { name } => {
                format!("Export {} or set rates.access_key in the config file", name)
            }
            Self::RateUnavailable { .. } => {
                "The rate provider does not publish this currency; try another provider".to_string()
            }
            Self::SourceUnreachable { .. } => {
                "Check network connectivity and the provider quota, then try again".to_string()
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Fix the configuration file and run again".to_string()
            }
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::SerializationError(_) => "The data could not be (de)serialized".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { country } => format!("Unknown country: {}", country),
            Self::MissingCredential { .. } => {
                "Exchange rates need an access key, none was configured".to_string()
            }
            Self::SourceUnreachable { .. } => {
                "The exchange rate service could not be reached".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TravelError>;
