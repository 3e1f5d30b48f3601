//! Error types for the backend

use thiserror::Error;

/// Backend-wide error type
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HealthError {
    pub fn api(msg: impl Into<String>) -> Self {
        HealthError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        HealthError::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        HealthError::Auth(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        HealthError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        HealthError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        HealthError::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        HealthError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        HealthError::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        HealthError::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        HealthError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        HealthError::Internal(msg.into())
    }
}

/// Result type alias for backend operations
pub type HealthResult<T> = Result<T, HealthError>;
