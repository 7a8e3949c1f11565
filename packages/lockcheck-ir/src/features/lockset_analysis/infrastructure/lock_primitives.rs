//! Lock primitive recognition
//!
//! A static callee is an acquisition if it is a method of the sync package
//! whose name matches a configured acquire primitive (`Lock`, `RLock`), or if
//! its qualified name is configured verbatim. Releases likewise.

use rustc_hash::FxHashSet;

use crate::config::AnalysisConfig;
use crate::features::program_model::{Function, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOp {
    Acquire,
    Release,
}

#[derive(Debug, Clone)]
pub struct LockPrimitives {
    acquire: FxHashSet<String>,
    release: FxHashSet<String>,
    acquire_names: FxHashSet<String>,
    release_names: FxHashSet<String>,
    sync_package: String,
}

impl LockPrimitives {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let names = |list: &[String]| list.iter().map(|q| method_name(q).to_string()).collect();
        Self {
            acquire: config.acquire_primitives.iter().cloned().collect(),
            release: config.release_primitives.iter().cloned().collect(),
            acquire_names: names(&config.acquire_primitives),
            release_names: names(&config.release_primitives),
            sync_package: config.sync_package.clone(),
        }
    }

    pub fn classify(&self, program: &Program, callee: &Function) -> Option<LockOp> {
        let in_sync = callee.package.as_deref() == Some(self.sync_package.as_str());
        let qualified = program.qualified_name(callee);

        if (in_sync && self.acquire_names.contains(&callee.name)) || self.acquire.contains(&qualified) {
            Some(LockOp::Acquire)
        } else if (in_sync && self.release_names.contains(&callee.name))
            || self.release.contains(&qualified)
        {
            Some(LockOp::Release)
        } else {
            None
        }
    }
}

impl Default for LockPrimitives {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// `(*sync.Mutex).Lock` → `Lock`
fn method_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
