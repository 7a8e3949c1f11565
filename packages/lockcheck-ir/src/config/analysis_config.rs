//! Lockset analysis settings

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Qualified names of the lock acquisition methods in `sync`
pub const DEFAULT_ACQUIRE_PRIMITIVES: &[&str] = &[
    "(*sync.Mutex).Lock",
    "(*sync.RWMutex).Lock",
    "(*sync.RWMutex).RLock",
];

/// Qualified names of the lock release methods in `sync`
pub const DEFAULT_RELEASE_PRIMITIVES: &[&str] = &[
    "(*sync.Mutex).Unlock",
    "(*sync.RWMutex).Unlock",
    "(*sync.RWMutex).RUnlock",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Qualified names (`(*pkg.T).Method`) treated as lock acquisition
    pub acquire_primitives: Vec<String>,

    /// Qualified names treated as lock release
    pub release_primitives: Vec<String>,

    /// Package whose methods named like a primitive count as one
    /// regardless of receiver (e.g. `Lock` on any `sync` type)
    pub sync_package: String,

    /// Analyze function literals after their enclosing function
    pub analyze_nested_functions: bool,

    /// Add `returns(L)` targets to the caller's lockset after a call
    pub propagate_returns: bool,

    /// Analyze functions on the rayon pool
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            acquire_primitives: DEFAULT_ACQUIRE_PRIMITIVES.iter().map(|s| s.to_string()).collect(),
            release_primitives: DEFAULT_RELEASE_PRIMITIVES.iter().map(|s| s.to_string()).collect(),
            sync_package: "sync".to_string(),
            analyze_nested_functions: true,
            propagate_returns: false,
            parallel: false,
        }
    }
}

impl AnalysisConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_propagate_returns(mut self, enabled: bool) -> Self {
        self.propagate_returns = enabled;
        self
    }

    pub fn with_nested_functions(mut self, enabled: bool) -> Self {
        self.analyze_nested_functions = enabled;
        self
    }

    /// Add a custom acquire/release pair, e.g. `(*spin.Lock).Acquire`
    pub fn with_primitive_pair(mut self, acquire: impl Into<String>, release: impl Into<String>) -> Self {
        self.acquire_primitives.push(acquire.into());
        self.release_primitives.push(release.into());
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.acquire_primitives.is_empty() {
            return Err(ConfigError::empty_with_hint(
                "acquire_primitives",
                "List at least one method such as '(*sync.Mutex).Lock'.",
            ));
        }
        if self.release_primitives.is_empty() {
            return Err(ConfigError::empty_with_hint(
                "release_primitives",
                "List at least one method such as '(*sync.Mutex).Unlock'.",
            ));
        }
        if let Some(p) = self
            .acquire_primitives
            .iter()
            .find(|p| self.release_primitives.contains(p))
        {
            return Err(ConfigError::Conflict {
                primitive: p.clone(),
            });
        }
        if self.sync_package.trim().is_empty() {
            return Err(ConfigError::empty_with_hint(
                "sync_package",
                "Use 'sync' unless your locks live elsewhere.",
            ));
        }
        Ok(())
    }
}
