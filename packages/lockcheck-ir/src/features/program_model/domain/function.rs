//! Functions and basic blocks

use serde::{Deserialize, Serialize};

use super::ids::{BlockId, DeclId, FunctionId, TypeId, ValueId};
use super::values::{Instruction, Value};
use crate::shared::models::Span;

/// Basic block: straight-line instructions plus successor edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub index: BlockId,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub successors: Vec<BlockId>,
}

impl BasicBlock {
    pub fn new(index: BlockId) -> Self {
        Self {
            index,
            instructions: Vec::new(),
            successors: Vec::new(),
        }
    }
}

/// A function body (or an external declaration when `blocks` is empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    /// Declaring package path
    #[serde(default)]
    pub package: Option<String>,
    /// Receiver type (`*Account` for `func (a *Account) ...`)
    #[serde(default)]
    pub receiver: Option<TypeId>,
    /// Formal parameters, receiver first
    #[serde(default)]
    pub params: Vec<DeclId>,
    #[serde(default)]
    pub values: Vec<Value>,
    /// Block 0 is the entry block
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
    /// Function literals lexically owned by this function
    #[serde(default)]
    pub anon_funcs: Vec<FunctionId>,
    #[serde(default)]
    pub parent: Option<FunctionId>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub span: Span,
}

impl Function {
    pub fn new(id: FunctionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            package: None,
            receiver: None,
            params: Vec::new(),
            values: Vec::new(),
            blocks: Vec::new(),
            anon_funcs: Vec::new(),
            parent: None,
            file_path: None,
            span: Span::zero(),
        }
    }

    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id.index())
    }

    pub fn has_body(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn is_anonymous(&self) -> bool {
        self.parent.is_some()
    }
}
