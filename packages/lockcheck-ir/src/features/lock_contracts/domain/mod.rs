/// Lock Contracts Domain Models
pub mod annotation_kind;
pub mod contract;
pub mod registry;

pub use annotation_kind::*;
pub use contract::*;
pub use registry::*;
