//! Diagnostics and the append-only sink

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::models::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One unmet requirement at one call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Qualified name of the function containing the call
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Position of the call
    pub span: Span,
    pub severity: Severity,
    pub message: String,
    /// Called function
    pub callee: String,
    /// Requirement target as written in the callee's contract
    pub target: String,
}

impl Diagnostic {
    pub fn missing_lock(
        function: impl Into<String>,
        file_path: Option<String>,
        span: Span,
        callee: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let callee = callee.into();
        let target = target.into();
        Self {
            function: function.into(),
            file_path,
            span,
            severity: Severity::Warning,
            message: format!("call to {} requires lock {}, but it is not held", callee, target),
            callee,
            target,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_path {
            Some(path) => write!(f, "{}:{}: {}: {}", path, self.span, self.severity, self.message),
            None => write!(f, "{}: {}: {}", self.span, self.severity, self.message),
        }
    }
}

/// Ordered, append-only diagnostic collection
///
/// No deduplication and no suppression; the caller decides how to format,
/// sort or aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a warning
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append `other` after the current entries
    pub fn extend(&mut self, other: DiagnosticSink) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
