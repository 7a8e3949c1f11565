/// Lock Contracts Feature
///
/// Lock obligations attached to functions (`requires`, `acquires`, `returns`)
/// and data (`guarded_by`), plus the front-end that extracts them from
/// annotated Go sources.
///
/// ## Architecture
/// - **Domain**: AnnotationKind, Requirement, FunctionContract, DataInvariant, ContractRegistry
/// - **Infrastructure**: annotation parser, tree-sitter Go extractor
/// - **Application**: BuildRegistryUseCase
/// - **Ports**: ContractSource trait
///
/// The registry is built once (through `ContractRegistryBuilder`) and is
/// read-only for the whole analysis run.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
pub use ports::*;
