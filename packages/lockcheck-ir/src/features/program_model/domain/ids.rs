//! Index newtypes for the program model.
//!
//! Every id is an index into the owning table (`Program::types`,
//! `Program::decls`, `Program::functions`, `Function::values`,
//! `Function::blocks`). `Program::validate` guarantees they are in range.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_id!(
    /// Index into `Program::types`
    TypeId,
    "t"
);
index_id!(
    /// Index into `Program::decls`; the stable identity of a declaration
    DeclId,
    "d"
);
index_id!(
    /// Index into `Program::functions`
    FunctionId,
    "fn"
);
index_id!(
    /// Index into `Function::values` (function-local)
    ValueId,
    "v"
);
index_id!(
    /// Index into `Function::blocks` (function-local)
    BlockId,
    "b"
);
