//! Error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScannerError>;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// A commit was attempted without an allowing decision
    #[error("Safety gate misuse: {0}")]
    GateMisuse(String),

    #[error("State store error: {0}")]
    StateStore(String),
}
