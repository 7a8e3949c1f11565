//! Types and declarations
//!
//! A deliberately small slice of a Go-like type system: enough to walk
//! `a.b.c` field paths through pointers and named struct types.

use serde::{Deserialize, Serialize};

use super::ids::{DeclId, FunctionId, TypeId};
use crate::shared::models::Span;

/// Type constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    /// Predeclared type (`int`, `bool`, `string`, ...)
    Basic { name: String },
    /// Declared type (`type Account struct {...}`)
    Named {
        /// Declaring package path (`sync`, `bank`, ...)
        package: Option<String>,
        name: String,
        underlying: TypeId,
        /// Methods declared on `T` or `*T`, in declaration order
        #[serde(default)]
        methods: Vec<FunctionId>,
    },
    /// Struct literal type; fields are `DeclKind::Field` declarations
    Struct { fields: Vec<DeclId> },
    Pointer { elem: TypeId },
    Slice { elem: TypeId },
    Map { key: TypeId, value: TypeId },
    Interface {
        #[serde(default)]
        methods: Vec<String>,
    },
    /// Function type; parameters are not tracked
    Signature,
}

/// Declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// Function parameter (the receiver is a parameter too)
    Param,
    /// Struct field
    Field,
    /// Package-level variable
    Global,
}

/// A named, typed declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    pub id: DeclId,
    pub name: String,
    pub kind: DeclKind,
    pub ty: TypeId,
    /// Struct type owning a field (the `Named` type when there is one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<TypeId>,
    #[serde(default)]
    pub span: Span,
}

impl Decl {
    pub fn is_field(&self) -> bool {
        self.kind == DeclKind::Field
    }
}
