/// Program Model Domain
pub mod function;
pub mod ids;
pub mod program;
pub mod types;
pub mod values;

pub use function::*;
pub use ids::*;
pub use program::*;
pub use types::*;
pub use values::*;
