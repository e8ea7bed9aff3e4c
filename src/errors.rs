use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to access messaging platform: {0}")]
    PlatformError(String),

    #[error("Failed to access completion provider: {0}")]
    ProviderError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("A summarization is already in progress")]
    Busy,
}

impl RecapError {
    /// HTTP status the relay answers with when this error ends a request.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            RecapError::ConfigError(_) => 500,
            RecapError::ParseError(_) => 400,
            RecapError::Busy => 409,
            RecapError::PlatformError(_)
            | RecapError::ProviderError(_)
            | RecapError::HttpError(_) => 502,
        }
    }
}

impl From<reqwest::Error> for RecapError {
    fn from(error: reqwest::Error) -> Self {
        RecapError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for RecapError {
    fn from(error: serde_json::Error) -> Self {
        RecapError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for RecapError {
    fn from(error: anyhow::Error) -> Self {
        RecapError::ProviderError(error.to_string())
    }
}
