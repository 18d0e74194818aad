//! Error types for the selector
//!
//! Nothing in the gesture path returns errors: failures there are logged and
//! recovered. Only configuration can be rejected.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectorError>;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
