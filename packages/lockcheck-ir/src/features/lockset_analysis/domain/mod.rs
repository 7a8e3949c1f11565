/// Lockset Analysis Domain Models
pub mod analysis_state;
pub mod diagnostic;
pub mod lock_identity;
pub mod lock_set;

pub use analysis_state::*;
pub use diagnostic::*;
pub use lock_identity::*;
pub use lock_set::*;
