//! SSA-style values and instructions

use serde::{Deserialize, Serialize};

use super::ids::{DeclId, FunctionId, TypeId, ValueId};
use crate::shared::models::Span;

/// How a value was produced
///
/// Only the address-forming constructs are transparent to lock identity
/// tracing; anything else is `Opaque`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ValueKind {
    /// Use of a function parameter (including the receiver)
    Parameter { decl: DeclId },
    /// Address of a package-level variable
    Global { decl: DeclId },
    /// `&x.f`: `base` is a pointer to a struct, `field` the field index
    FieldAddr { base: ValueId, field: usize },
    /// `*p`
    Deref { base: ValueId },
    /// `&a[i]`: the index is not tracked
    IndexAddr { base: ValueId },
    /// Any other construct (call results, phis, conversions, ...)
    Opaque {
        #[serde(default)]
        description: String,
    },
}

/// A typed SSA value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub id: ValueId,
    pub ty: TypeId,
    #[serde(flatten)]
    pub kind: ValueKind,
}

/// Call target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Statically known function
    Static(FunctionId),
    /// Interface dispatch or function value
    Dynamic,
}

/// Call operands; for methods the receiver is `args[0]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInstr {
    pub callee: Callee,
    #[serde(default)]
    pub args: Vec<ValueId>,
    #[serde(default)]
    pub span: Span,
}

impl CallInstr {
    pub fn static_callee(&self) -> Option<FunctionId> {
        match self.callee {
            Callee::Static(id) => Some(id),
            Callee::Dynamic => None,
        }
    }

    /// First argument: the receiver for method calls
    pub fn receiver(&self) -> Option<ValueId> {
        self.args.first().copied()
    }
}

/// Instruction classes the lockset analysis distinguishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instr", rename_all = "snake_case")]
pub enum Instruction {
    /// Ordinary call (lock/unlock primitives included)
    Call(CallInstr),
    /// `defer f(...)`: runs at function exit
    Defer(CallInstr),
    /// Function exit point where deferred calls run
    RunDefers {
        #[serde(default)]
        span: Span,
    },
    /// Anything else (stores, arithmetic, jumps, ...)
    Other {
        #[serde(default)]
        span: Span,
    },
}

impl Instruction {
    pub fn span(&self) -> Span {
        match self {
            Instruction::Call(call) | Instruction::Defer(call) => call.span,
            Instruction::RunDefers { span } | Instruction::Other { span } => *span,
        }
    }
}
