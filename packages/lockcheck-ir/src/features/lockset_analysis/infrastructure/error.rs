/// Lockset analysis errors
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
