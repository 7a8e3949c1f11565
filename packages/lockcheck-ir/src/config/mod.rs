//! Analysis configuration
//!
//! Two tiers:
//! - Defaults: `AnalysisConfig::default()` matches the `sync` package and the
//!   core semantics exactly (no `returns` propagation, sequential run)
//! - YAML: a versioned file (`version: 1`) overriding any subset of fields
//!
//! # Examples
//!
//! ```rust,ignore
//! use lockcheck_ir::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default().with_parallel(true);
//! let config = AnalysisConfig::from_yaml("lockcheck.yaml")?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;

pub use analysis_config::AnalysisConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigExportV1;
