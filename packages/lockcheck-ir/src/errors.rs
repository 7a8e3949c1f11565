//! Error types for lockcheck-ir
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::lock_contracts::AnnotationError;
use crate::features::lockset_analysis::AnalysisError;

/// Main error type for lockcheck-ir operations
#[derive(Debug, Error)]
pub enum LockcheckError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Source parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed program model (dangling ids, missing entry block, ...)
    #[error("Invalid program: {0}")]
    Program(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Annotation error surfaced by a strict front-end
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Analysis setup error (unknown function, rejected configuration)
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl LockcheckError {
    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        LockcheckError::Parse(msg.into())
    }

    /// Create an invalid-program error
    pub fn invalid_program(msg: impl Into<String>) -> Self {
        LockcheckError::Program(msg.into())
    }
}

/// Result type alias for lockcheck operations
pub type Result<T> = std::result::Result<T, LockcheckError>;
