/// Lock Contracts Infrastructure
pub mod annotation_parser;
pub mod contract_sources;
pub mod error;
pub mod go_contract_extractor;

pub use annotation_parser::*;
pub use contract_sources::*;
pub use error::AnnotationError;
pub use go_contract_extractor::*;
