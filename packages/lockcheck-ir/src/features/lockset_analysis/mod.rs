/// Lockset Analysis Feature
///
/// Intraprocedural must-hold lockset analysis: proves, at every call site,
/// that each `requires` obligation of the callee's contract is held along
/// every control-flow path reaching the call.
///
/// ## Architecture
/// - **Domain**: LockIdentity, LockSet, AnalysisState, Diagnostic, DiagnosticSink
/// - **Infrastructure**: LockResolver, LockPrimitives, Interpreter, BlockWorklist, FixpointSolver
/// - **Application**: LocksetAnalysisUseCase
/// - **Ports**: LocksetAnalyzerPort trait
///
/// ## Lattice
/// - Element: set of lock identities, meet = intersection
/// - Height bounded by the number of lock-bearing declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export application layer (primary interface)
pub use application::*;

// Re-export domain types
pub use domain::*;

// Re-export infrastructure (internal use - prefer application layer)
#[doc(hidden)]
pub use infrastructure::*;

pub use ports::*;
