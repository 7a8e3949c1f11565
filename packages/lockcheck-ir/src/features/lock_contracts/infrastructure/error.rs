/// Annotation parse errors
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("invalid annotation format: {0:?}")]
    InvalidFormat(String),

    #[error("unknown annotation tag: {0:?}")]
    UnknownTag(String),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
