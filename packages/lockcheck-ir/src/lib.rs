/*
 * Lockcheck IR - Annotation-driven lockset checker
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Span)
 * - features/    : Vertical slices (program model → lock contracts → lockset analysis)
 * - config/      : Versioned analysis configuration
 * - pipeline/    : Orchestration (front-ends → analysis → report)
 *
 * Engineers annotate functions (`@requires`, `@acquires`, `@returns`) and data
 * (`@guarded_by`) with lock obligations; the lockset analysis proves, per call
 * site, that every `requires` obligation holds along every control-flow path.
 */

#![allow(clippy::too_many_arguments)] // Builder helpers mirror instruction operands
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::upper_case_acronyms)] // CFG, IR naming

/// Shared models and utilities
pub mod shared;

/// Feature modules (program model, contracts, lockset analysis)
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::AnalysisConfig;
pub use errors::{LockcheckError, Result};
pub use features::lock_contracts::{
    AnnotationKind, ContractRegistry, ContractRegistryBuilder, DataInvariant, FunctionContract,
    Requirement,
};
pub use features::lockset_analysis::{
    AnalysisState, Diagnostic, DiagnosticSink, LockIdentity, LockSet, LocksetAnalysisUseCase,
    Severity,
};
pub use features::program_model::{Program, ProgramBuilder, ProgramLoader};
pub use pipeline::{AnalysisReport, LockcheckEngine, ReportFormat};
pub use shared::models::Span;
