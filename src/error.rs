use thiserror::Error as ThisError;

use crate::services::jquants::JquantsError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Rate limit exceeded")]
    RateLimit,
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<JquantsError> for AppError {
    fn from(err: JquantsError) -> Self {
        match err {
            JquantsError::RateLimit => AppError::RateLimit,
            JquantsError::NoData => AppError::NoData("empty API response".to_string()),
            JquantsError::Auth(msg) => AppError::Config(msg),
            other => AppError::Network(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
