/// Program Model Feature
///
/// The typed, per-function control-flow graph the lockset analysis consumes.
/// Loading/parsing of real source programs is owned by external front-ends;
/// they hand the core a `Program`, either built in-process with
/// `ProgramBuilder` or serialized as JSON and read back with `ProgramLoader`.
///
/// ## Architecture
/// - **Domain**: ids, type table, declarations, values, instructions, functions
/// - **Infrastructure**: ProgramBuilder, ProgramLoader (JSON)
pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
