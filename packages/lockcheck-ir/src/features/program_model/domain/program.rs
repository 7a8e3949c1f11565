//! Whole-program container and type queries

use serde::{Deserialize, Serialize};

use super::function::Function;
use super::ids::{BlockId, DeclId, FunctionId, TypeId, ValueId};
use super::types::{Decl, DeclKind, TypeKind};
use super::values::{Callee, Instruction, ValueKind};
use crate::errors::{LockcheckError, Result};

/// Package member, in front-end enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", content = "id", rename_all = "snake_case")]
pub enum Member {
    Function(FunctionId),
    Type(TypeId),
    Global(DeclId),
}

/// One analyzed package plus every declaration it references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Package path of the analyzed package
    pub package: String,
    #[serde(default)]
    pub types: Vec<TypeKind>,
    #[serde(default)]
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Program {
    pub fn ty(&self, id: TypeId) -> Option<&TypeKind> {
        self.types.get(id.index())
    }

    pub fn decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    /// Strip `Named` layers
    pub fn underlying(&self, mut id: TypeId) -> Option<TypeId> {
        // Bounded by the table size so a cyclic Named chain cannot spin.
        for _ in 0..=self.types.len() {
            match self.ty(id)? {
                TypeKind::Named { underlying, .. } => id = *underlying,
                _ => return Some(id),
            }
        }
        None
    }

    /// Element type if `id` is (a name for) a pointer
    pub fn pointer_elem(&self, id: TypeId) -> Option<TypeId> {
        match self.ty(self.underlying(id)?)? {
            TypeKind::Pointer { elem } => Some(*elem),
            _ => None,
        }
    }

    /// Unwrap at most one level of pointer indirection
    pub fn deref_once(&self, id: TypeId) -> TypeId {
        self.pointer_elem(id).unwrap_or(id)
    }

    /// Field declarations if `id` is (a name for) a struct
    pub fn struct_fields(&self, id: TypeId) -> Option<&[DeclId]> {
        match self.ty(self.underlying(id)?)? {
            TypeKind::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    /// Field of struct type `id` called `name`
    pub fn field_named(&self, id: TypeId, name: &str) -> Option<&Decl> {
        self.struct_fields(id)?
            .iter()
            .filter_map(|f| self.decl(*f))
            .find(|f| f.name == name)
    }

    /// Package-level variable called `name`
    pub fn global_named(&self, name: &str) -> Option<&Decl> {
        self.members.iter().find_map(|m| match m {
            Member::Global(id) => self.decl(*id).filter(|d| d.name == name),
            _ => None,
        })
    }

    /// Go-style rendering, e.g. `*bank.Account`, `[]sync.Mutex`
    pub fn type_string(&self, id: TypeId) -> String {
        self.type_string_depth(id, 0)
    }

    fn type_string_depth(&self, id: TypeId, depth: usize) -> String {
        if depth > self.types.len() {
            return "?".to_string();
        }
        let Some(kind) = self.ty(id) else {
            return format!("<invalid {}>", id);
        };
        match kind {
            TypeKind::Basic { name } => name.clone(),
            TypeKind::Named { package, name, .. } => match package {
                Some(pkg) if !pkg.is_empty() => format!("{}.{}", pkg, name),
                _ => name.clone(),
            },
            TypeKind::Struct { fields } => {
                let names: Vec<_> = fields
                    .iter()
                    .filter_map(|f| self.decl(*f))
                    .map(|f| format!("{} {}", f.name, self.type_string_depth(f.ty, depth + 1)))
                    .collect();
                format!("struct{{{}}}", names.join("; "))
            }
            TypeKind::Pointer { elem } => format!("*{}", self.type_string_depth(*elem, depth + 1)),
            TypeKind::Slice { elem } => format!("[]{}", self.type_string_depth(*elem, depth + 1)),
            TypeKind::Map { key, value } => format!(
                "map[{}]{}",
                self.type_string_depth(*key, depth + 1),
                self.type_string_depth(*value, depth + 1)
            ),
            TypeKind::Interface { .. } => "interface{...}".to_string(),
            TypeKind::Signature => "func(...)".to_string(),
        }
    }

    /// Fully qualified function name: `(*sync.Mutex).Lock`, `bank.Transfer`
    pub fn qualified_name(&self, function: &Function) -> String {
        match function.receiver {
            Some(recv) => format!("({}).{}", self.type_string(recv), function.name),
            None => match &function.package {
                Some(pkg) if !pkg.is_empty() => format!("{}.{}", pkg, function.name),
                _ => function.name.clone(),
            },
        }
    }

    /// Methods whose receiver is exactly `recv` (`T` or `*T`)
    pub fn methods_with_receiver(&self, named: TypeId, recv: TypeId) -> Vec<FunctionId> {
        let Some(TypeKind::Named { methods, .. }) = self.ty(named) else {
            return Vec::new();
        };
        methods
            .iter()
            .copied()
            .filter(|m| self.function(*m).and_then(|f| f.receiver) == Some(recv))
            .collect()
    }

    /// Method set of `T`: value-receiver methods only
    pub fn value_method_set(&self, named: TypeId) -> Vec<FunctionId> {
        self.methods_with_receiver(named, named)
    }

    /// Method set of `*T`: every method declared on `T` or `*T`
    pub fn pointer_method_set(&self, named: TypeId) -> Vec<FunctionId> {
        match self.ty(named) {
            Some(TypeKind::Named { methods, .. }) => methods.clone(),
            _ => Vec::new(),
        }
    }

    /// Check every id reference; the analysis relies on this having passed
    pub fn validate(&self) -> Result<()> {
        let types = self.types.len();
        let decls = self.decls.len();
        let functions = self.functions.len();
        let type_ok = |t: TypeId| t.index() < types;
        let decl_ok = |d: DeclId| d.index() < decls;
        let fn_ok = |f: FunctionId| f.index() < functions;

        for (i, kind) in self.types.iter().enumerate() {
            let refs_ok = match kind {
                TypeKind::Named {
                    underlying,
                    methods,
                    ..
                } => type_ok(*underlying) && methods.iter().all(|m| fn_ok(*m)),
                TypeKind::Struct { fields } => fields.iter().all(|f| {
                    decl_ok(*f) && self.decls[f.index()].kind == DeclKind::Field
                }),
                TypeKind::Pointer { elem } | TypeKind::Slice { elem } => type_ok(*elem),
                TypeKind::Map { key, value } => type_ok(*key) && type_ok(*value),
                TypeKind::Basic { .. } | TypeKind::Interface { .. } | TypeKind::Signature => true,
            };
            if !refs_ok {
                return Err(LockcheckError::invalid_program(format!(
                    "type t{} references an unknown type, field or method",
                    i
                )));
            }
        }

        for (i, decl) in self.decls.iter().enumerate() {
            if decl.id.index() != i || !type_ok(decl.ty) || !decl.owner.map_or(true, type_ok) {
                return Err(LockcheckError::invalid_program(format!(
                    "declaration '{}' at index {} is inconsistent",
                    decl.name, i
                )));
            }
        }

        for (i, func) in self.functions.iter().enumerate() {
            self.validate_function(i, func, &type_ok, &decl_ok, &fn_ok)?;
        }

        for member in &self.members {
            let ok = match member {
                Member::Function(f) => fn_ok(*f),
                Member::Type(t) => type_ok(*t),
                Member::Global(d) => {
                    decl_ok(*d) && self.decls[d.index()].kind == DeclKind::Global
                }
            };
            if !ok {
                return Err(LockcheckError::invalid_program(format!(
                    "package member {:?} is dangling",
                    member
                )));
            }
        }

        Ok(())
    }

    fn validate_function(
        &self,
        index: usize,
        func: &Function,
        type_ok: &dyn Fn(TypeId) -> bool,
        decl_ok: &dyn Fn(DeclId) -> bool,
        fn_ok: &dyn Fn(FunctionId) -> bool,
    ) -> Result<()> {
        let invalid = |what: String| {
            Err(LockcheckError::invalid_program(format!(
                "function '{}': {}",
                func.name, what
            )))
        };

        if func.id.index() != index {
            return invalid(format!("id {} stored at index {}", func.id, index));
        }
        if !func.receiver.map_or(true, type_ok) {
            return invalid("unknown receiver type".to_string());
        }
        if let Some(p) = func.params.iter().find(|p| !decl_ok(**p)) {
            return invalid(format!("unknown parameter {}", p));
        }
        if !func.parent.map_or(true, fn_ok) {
            return invalid("unknown parent".to_string());
        }
        if let Some(f) = func.anon_funcs.iter().find(|f| !fn_ok(**f)) {
            return invalid(format!("unknown nested function {}", f));
        }

        let value_ok = |v: ValueId| v.index() < func.values.len();
        for (i, value) in func.values.iter().enumerate() {
            let ok = value.id.index() == i
                && type_ok(value.ty)
                && match &value.kind {
                    ValueKind::Parameter { decl } | ValueKind::Global { decl } => decl_ok(*decl),
                    ValueKind::FieldAddr { base, .. }
                    | ValueKind::Deref { base }
                    | ValueKind::IndexAddr { base } => value_ok(*base),
                    ValueKind::Opaque { .. } => true,
                };
            if !ok {
                return invalid(format!("value v{} is inconsistent", i));
            }
        }

        let block_ok = |b: BlockId| b.index() < func.blocks.len();
        for (i, block) in func.blocks.iter().enumerate() {
            if block.index.index() != i {
                return invalid(format!("block {} stored at index {}", block.index, i));
            }
            if let Some(s) = block.successors.iter().find(|s| !block_ok(**s)) {
                return invalid(format!("block b{} has unknown successor {}", i, s));
            }
            for instr in &block.instructions {
                if let Instruction::Call(call) | Instruction::Defer(call) = instr {
                    if let Callee::Static(target) = call.callee {
                        if !fn_ok(target) {
                            return invalid(format!("call to unknown function {}", target));
                        }
                    }
                    if let Some(a) = call.args.iter().find(|a| !value_ok(**a)) {
                        return invalid(format!("call in b{} uses unknown value {}", i, a));
                    }
                }
            }
        }

        Ok(())
    }
}
