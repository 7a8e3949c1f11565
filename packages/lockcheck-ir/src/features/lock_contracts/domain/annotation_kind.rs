use serde::{Deserialize, Serialize};
use std::fmt;

/// Annotation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// `@requires(L)`: caller must hold `L`
    Requires,
    /// `@acquires(L)`: the function takes `L` itself
    Acquires,
    /// `@returns(L)`: the function returns with `L` held
    Returns,
    /// `@guarded_by(L)`: data may only be touched with `L` held
    GuardedBy,
}

impl AnnotationKind {
    /// Match a tag name, ignoring ASCII case
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "requires" => Some(Self::Requires),
            "acquires" => Some(Self::Acquires),
            "returns" => Some(Self::Returns),
            "guarded_by" => Some(Self::GuardedBy),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::Acquires => "acquires",
            Self::Returns => "returns",
            Self::GuardedBy => "guarded_by",
        }
    }

    /// Kinds that make sense on a function declaration
    pub fn is_function_kind(&self) -> bool {
        !matches!(self, Self::GuardedBy)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Requires => "Requires",
            Self::Acquires => "Acquires",
            Self::Returns => "Returns",
            Self::GuardedBy => "GuardedBy",
        };
        f.write_str(name)
    }
}
