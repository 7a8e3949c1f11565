//! Function contracts and data invariants

use serde::{Deserialize, Serialize};

use super::annotation_kind::AnnotationKind;
use crate::shared::models::Span;

/// One annotation instance: `kind(target)`
///
/// `target` is a dotted lock path (`mu`, `from.mu`, `b.vault.mu`) relative to
/// the annotated function's parameters/receiver or the annotated field's struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    pub kind: AnnotationKind,
    pub target: String,
}

impl Requirement {
    pub fn new(kind: AnnotationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }

    pub fn requires(target: impl Into<String>) -> Self {
        Self::new(AnnotationKind::Requires, target)
    }
}

/// Ordered obligations of one function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionContract {
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl FunctionContract {
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self {
            requirements,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, file_path: Option<String>, span: Span) -> Self {
        self.file_path = file_path;
        self.span = span;
        self
    }

    /// Targets of one annotation kind, in declaration order
    pub fn targets(&self, kind: AnnotationKind) -> impl Iterator<Item = &str> {
        self.requirements
            .iter()
            .filter(move |r| r.kind == kind)
            .map(|r| r.target.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

/// `guarded_by` obligation of a field or package-level variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInvariant {
    pub mutex_name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl DataInvariant {
    pub fn new(mutex_name: impl Into<String>) -> Self {
        Self {
            mutex_name: mutex_name.into(),
            span: Span::zero(),
            file_path: None,
        }
    }
}

/// Registry key of a function: `<receiver>.<name>` or just `<name>`
pub fn make_function_key(name: &str, receiver_type: &str) -> String {
    if receiver_type.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", receiver_type, name)
    }
}

/// Drop package qualifiers from every identifier in a type expression,
/// keeping the punctuation: `*bank.Account` → `*Account`,
/// `map[string]*x.T` → `map[string]*T`
pub fn normalize_type_name(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len());
    let mut token = String::new();

    fn flush(token: &mut String, out: &mut String) {
        if token.is_empty() {
            return;
        }
        match token.rfind('.') {
            Some(dot) => out.push_str(&token[dot + 1..]),
            None => out.push_str(token),
        }
        token.clear();
    }

    for c in type_name.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            token.push(c);
        } else {
            flush(&mut token, &mut out);
            out.push(c);
        }
    }
    flush(&mut token, &mut out);
    out
}
