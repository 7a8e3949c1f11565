//! Canonical lock identity

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::program_model::{DeclId, DeclKind, Program, TypeKind};

/// One lock-bearing declaration: a parameter, a struct field or a
/// package-level variable
///
/// Fields are identified by their declaration in the struct type, so `a.mu`
/// and `b.mu` with `a, b *Account` denote the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockIdentity(DeclId);

impl LockIdentity {
    pub fn new(decl: DeclId) -> Self {
        Self(decl)
    }

    pub fn decl(self) -> DeclId {
        self.0
    }

    /// Human-readable name: `Account.mu`, `registryMu`, `m`
    pub fn describe(self, program: &Program) -> String {
        let Some(decl) = program.decl(self.0) else {
            return self.to_string();
        };
        match (decl.kind, decl.owner.and_then(|o| program.ty(o))) {
            (DeclKind::Field, Some(TypeKind::Named { name, .. })) => format!("{}.{}", name, decl.name),
            _ => decl.name.clone(),
        }
    }
}

impl fmt::Display for LockIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock({})", self.0)
    }
}

impl From<DeclId> for LockIdentity {
    fn from(decl: DeclId) -> Self {
        Self(decl)
    }
}
