use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Calculation result has no yearly values")]
    EmptySeries,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    UserInput,
    Presentation,
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

impl SimError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Api { .. } => ErrorCategory::Backend,
            Self::Validation { .. } => ErrorCategory::UserInput,
            Self::InvalidInput { .. } | Self::EmptySeries => ErrorCategory::Presentation,
            Self::Config { .. } | Self::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } => ErrorSeverity::Low,
            Self::Network(_) | Self::Api { .. } => ErrorSeverity::Medium,
            Self::InvalidInput { .. } | Self::EmptySeries => ErrorSeverity::High,
            Self::Config { .. } | Self::InvalidConfigValue { .. } => ErrorSeverity::High,
            Self::Io(_) | Self::Serialization(_) | Self::Csv(_) => ErrorSeverity::Critical,
        }
    }

    /// Backend `detail` text, surfaced verbatim when alerting is enabled.
    pub fn backend_detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is running and the API base URL is correct",
            ErrorCategory::Backend => "Review the backend message; the project or unit may no longer exist",
            ErrorCategory::UserInput => "Select a project with available units and try again",
            ErrorCategory::Presentation => "The backend returned an unusable result; try another unit or horizon",
            ErrorCategory::Configuration => "Check plusvalia.toml and the PLUSVALIA_* environment variables",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            } => format!("Error: {}", detail),
            Self::Api { detail: None, .. } => {
                "Error: Hubo un problema al procesar tu solicitud".to_string()
            }
            Self::Validation { .. } => "Por favor selecciona una unidad disponible".to_string(),
            Self::Network(_) => "No se pudo conectar con el servidor".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
