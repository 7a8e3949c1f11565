//! Pipeline orchestration
//!
//! ```text
//! Go sources ─┐
//!             ├─► ContractRegistry (frozen) ─┐
//! JSON        ┘                              ├─► LocksetAnalysisUseCase ─► AnalysisReport
//! Program JSON ──────────────────────────────┘
//! ```

pub mod engine;
pub mod report;

pub use engine::LockcheckEngine;
pub use report::{AnalysisReport, ReportFormat};
