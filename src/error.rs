//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raw failure from the remote model API. Never shown to users.
    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// A remote call failed or returned unusable data. Carries a generic,
    /// user-safe message; the detail has already been logged.
    #[error("{0}")]
    Generation(String),

    /// A required input was missing. Detected locally, before any remote call.
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
