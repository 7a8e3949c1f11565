/// Lockset Analysis Infrastructure
pub mod error;
pub mod fixpoint;
pub mod interpreter;
pub mod lock_primitives;
pub mod resolver;
pub mod worklist;

pub use error::AnalysisError;
pub use fixpoint::*;
pub use interpreter::*;
pub use lock_primitives::*;
pub use resolver::*;
pub use worklist::*;
