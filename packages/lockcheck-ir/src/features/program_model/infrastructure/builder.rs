//! ProgramBuilder - fluent construction of `Program` values
//!
//! Front-ends that lower real source code, and the test-suite, build programs
//! through this API instead of filling the tables by hand. Ids are handed out
//! as entities are created; mistakes (unknown fields, dereferencing a
//! non-pointer, out-of-range blocks) are collected and reported by `build()`.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{LockcheckError, Result};
use crate::features::program_model::domain::{
    BasicBlock, BlockId, CallInstr, Callee, Decl, DeclId, DeclKind, Function, FunctionId,
    Instruction, Member, Program, TypeId, TypeKind, Value, ValueId, ValueKind,
};
use crate::shared::models::Span;

/// Handles to the declared `sync` package
#[derive(Debug, Clone, Copy)]
pub struct SyncPackage {
    pub mutex: TypeId,
    pub rw_mutex: TypeId,
    /// `(*sync.Mutex).Lock`
    pub lock: FunctionId,
    /// `(*sync.Mutex).Unlock`
    pub unlock: FunctionId,
    /// `(*sync.RWMutex).Lock`
    pub rw_lock: FunctionId,
    /// `(*sync.RWMutex).Unlock`
    pub rw_unlock: FunctionId,
    /// `(*sync.RWMutex).RLock`
    pub rlock: FunctionId,
    /// `(*sync.RWMutex).RUnlock`
    pub runlock: FunctionId,
}

/// Incrementally builds a validated `Program`
pub struct ProgramBuilder {
    program: Program,
    pending: FxHashSet<FunctionId>,
    basics: FxHashMap<String, TypeId>,
    pointers: FxHashMap<TypeId, TypeId>,
    errors: Vec<String>,
}

impl ProgramBuilder {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            program: Program {
                package: package.into(),
                ..Program::default()
            },
            pending: FxHashSet::default(),
            basics: FxHashMap::default(),
            pointers: FxHashMap::default(),
            errors: Vec::new(),
        }
    }

    /// Read access to the program under construction
    pub fn program(&self) -> &Program {
        &self.program
    }

    fn push_type(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId::new(self.program.types.len());
        self.program.types.push(kind);
        id
    }

    fn push_decl(&mut self, name: &str, kind: DeclKind, ty: TypeId, owner: Option<TypeId>) -> DeclId {
        let id = DeclId::new(self.program.decls.len());
        self.program.decls.push(Decl {
            id,
            name: name.to_string(),
            kind,
            ty,
            owner,
            span: Span::zero(),
        });
        id
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Predeclared type, interned by name
    pub fn basic(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.basics.get(name) {
            return *id;
        }
        let id = self.push_type(TypeKind::Basic {
            name: name.to_string(),
        });
        self.basics.insert(name.to_string(), id);
        id
    }

    /// `*elem`, interned
    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        if let Some(id) = self.pointers.get(&elem) {
            return *id;
        }
        let id = self.push_type(TypeKind::Pointer { elem });
        self.pointers.insert(elem, id);
        id
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.push_type(TypeKind::Slice { elem })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.push_type(TypeKind::Map { key, value })
    }

    pub fn signature(&mut self) -> TypeId {
        self.push_type(TypeKind::Signature)
    }

    /// Declare a named type whose underlying struct is defined later
    /// (needed for self-referential types such as `type Node struct { next *Node }`)
    pub fn declare_named(&mut self, package: Option<&str>, name: &str) -> TypeId {
        let named = TypeId::new(self.program.types.len());
        self.push_type(TypeKind::Named {
            package: package.map(str::to_string),
            name: name.to_string(),
            underlying: named,
            methods: Vec::new(),
        });
        if package.map_or(true, |p| p == self.program.package) {
            self.program.members.push(Member::Type(named));
        }
        named
    }

    /// Give a declared named type its struct body
    pub fn define_struct(&mut self, named: TypeId, fields: &[(&str, TypeId)]) {
        let decls: Vec<DeclId> = fields
            .iter()
            .map(|(name, ty)| self.push_decl(name, DeclKind::Field, *ty, Some(named)))
            .collect();
        let body = self.push_type(TypeKind::Struct { fields: decls });
        match self.program.types.get_mut(named.index()) {
            Some(TypeKind::Named { underlying, .. }) => *underlying = body,
            _ => self
                .errors
                .push(format!("define_struct: {} is not a named type", named)),
        }
    }

    /// `type <name> struct { ... }` in the analyzed package
    pub fn struct_type(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        let package = self.program.package.clone();
        let named = self.declare_named(Some(&package), name);
        self.define_struct(named, fields);
        named
    }

    /// Struct declared in another package (not a member of this one)
    pub fn external_struct(&mut self, package: &str, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        let named = self.declare_named(Some(package), name);
        self.define_struct(named, fields);
        named
    }

    /// `type <name> interface { ... }`
    pub fn interface(&mut self, name: &str, methods: &[&str]) -> TypeId {
        let package = self.program.package.clone();
        let named = self.declare_named(Some(&package), name);
        let body = self.push_type(TypeKind::Interface {
            methods: methods.iter().map(|m| m.to_string()).collect(),
        });
        if let Some(TypeKind::Named { underlying, .. }) = self.program.types.get_mut(named.index())
        {
            *underlying = body;
        }
        named
    }

    /// Field declaration `name` of struct type `ty` (or pointer to it)
    pub fn field(&self, ty: TypeId, name: &str) -> Option<DeclId> {
        let ty = self.program.deref_once(ty);
        self.program.field_named(ty, name).map(|d| d.id)
    }

    // ------------------------------------------------------------------
    // Package-level variables
    // ------------------------------------------------------------------

    pub fn global(&mut self, name: &str, ty: TypeId) -> DeclId {
        let id = self.push_decl(name, DeclKind::Global, ty, None);
        self.program.members.push(Member::Global(id));
        id
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    fn reserve_function(&mut self, name: &str) -> Function {
        let id = FunctionId::new(self.program.functions.len());
        self.program.functions.push(Function::new(id, name));
        self.pending.insert(id);
        let mut func = Function::new(id, name);
        func.package = Some(self.program.package.clone());
        func
    }

    fn attach_method(&mut self, recv_ty: TypeId, method: FunctionId) {
        let named = self.program.deref_once(recv_ty);
        match self.program.types.get_mut(named.index()) {
            Some(TypeKind::Named { methods, .. }) => methods.push(method),
            _ => self.errors.push(format!(
                "method {} has a receiver that is not a named type",
                method
            )),
        }
    }

    /// Body-less declaration (external package, assembly, ...)
    pub fn declare_function(
        &mut self,
        package: Option<&str>,
        name: &str,
        receiver: Option<(&str, TypeId)>,
        params: &[(&str, TypeId)],
    ) -> FunctionId {
        let mut func = self.reserve_function(name);
        func.package = package.map(str::to_string);
        if let Some((recv_name, recv_ty)) = receiver {
            func.receiver = Some(recv_ty);
            func.params
                .push(self.push_decl(recv_name, DeclKind::Param, recv_ty, None));
            self.attach_method(recv_ty, func.id);
        }
        for (pname, pty) in params {
            func.params
                .push(self.push_decl(pname, DeclKind::Param, *pty, None));
        }
        let id = func.id;
        self.pending.remove(&id);
        self.program.functions[id.index()] = func;
        id
    }

    /// Top-level function of the analyzed package
    pub fn function(&mut self, name: &str) -> FunctionBuilder<'_> {
        let func = self.reserve_function(name);
        self.program.members.push(Member::Function(func.id));
        FunctionBuilder::new(self, func)
    }

    /// Method `func (<recv_name> <recv_ty>) <name>(...)`; the receiver becomes
    /// the first parameter and is available as `receiver_value()`
    pub fn method(&mut self, name: &str, recv_name: &str, recv_ty: TypeId) -> FunctionBuilder<'_> {
        let mut func = self.reserve_function(name);
        func.receiver = Some(recv_ty);
        self.attach_method(recv_ty, func.id);
        let mut builder = FunctionBuilder::new(self, func);
        let recv = builder.param(recv_name, recv_ty);
        builder.receiver = Some(recv);
        builder
    }

    /// Function literal owned by the already finished function `parent`
    pub fn closure(&mut self, parent: FunctionId, name: &str) -> FunctionBuilder<'_> {
        let mut func = self.reserve_function(name);
        func.parent = Some(parent);
        FunctionBuilder::new(self, func)
    }

    /// Declare `sync.Mutex` / `sync.RWMutex` and their lock methods
    pub fn declare_sync_package(&mut self) -> SyncPackage {
        let int32 = self.basic("int32");
        let uint32 = self.basic("uint32");
        let mutex = self.external_struct("sync", "Mutex", &[("state", int32), ("sema", uint32)]);
        let rw_mutex = self.external_struct(
            "sync",
            "RWMutex",
            &[("w", mutex), ("readerCount", int32), ("readerWait", int32)],
        );
        let mutex_ptr = self.pointer(mutex);
        let rw_ptr = self.pointer(rw_mutex);
        let sync = Some("sync");
        SyncPackage {
            mutex,
            rw_mutex,
            lock: self.declare_function(sync, "Lock", Some(("m", mutex_ptr)), &[]),
            unlock: self.declare_function(sync, "Unlock", Some(("m", mutex_ptr)), &[]),
            rw_lock: self.declare_function(sync, "Lock", Some(("rw", rw_ptr)), &[]),
            rw_unlock: self.declare_function(sync, "Unlock", Some(("rw", rw_ptr)), &[]),
            rlock: self.declare_function(sync, "RLock", Some(("rw", rw_ptr)), &[]),
            runlock: self.declare_function(sync, "RUnlock", Some(("rw", rw_ptr)), &[]),
        }
    }

    /// Validate and return the program
    pub fn build(self) -> Result<Program> {
        if let Some(id) = self.pending.iter().min() {
            return Err(LockcheckError::invalid_program(format!(
                "function {} was never finished",
                id
            )));
        }
        if !self.errors.is_empty() {
            return Err(LockcheckError::invalid_program(self.errors.join("; ")));
        }
        self.program.validate()?;
        Ok(self.program)
    }
}

/// Builds one function body; `finish()` stores it in the program
pub struct FunctionBuilder<'a> {
    program: &'a mut ProgramBuilder,
    func: Function,
    receiver: Option<ValueId>,
}

impl<'a> FunctionBuilder<'a> {
    fn new(program: &'a mut ProgramBuilder, func: Function) -> Self {
        Self {
            program,
            func,
            receiver: None,
        }
    }

    pub fn id(&self) -> FunctionId {
        self.func.id
    }

    /// Receiver parameter value (methods only)
    pub fn receiver_value(&self) -> Option<ValueId> {
        self.receiver
    }

    /// Source location of the declaration
    pub fn at(&mut self, file_path: &str, span: Span) -> &mut Self {
        self.func.file_path = Some(file_path.to_string());
        self.func.span = span;
        self
    }

    fn push_value(&mut self, ty: TypeId, kind: ValueKind) -> ValueId {
        let id = ValueId::new(self.func.values.len());
        self.func.values.push(Value { id, ty, kind });
        id
    }

    fn value_type(&self, v: ValueId) -> Option<TypeId> {
        self.func.value(v).map(|v| v.ty)
    }

    fn error(&mut self, msg: String) {
        self.program
            .errors
            .push(format!("{}: {}", self.func.name, msg));
    }

    fn opaque_on_error(&mut self, msg: String) -> ValueId {
        self.error(msg.clone());
        let ty = self.program.basic("invalid");
        self.push_value(ty, ValueKind::Opaque { description: msg })
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Declare a formal parameter and return its use
    pub fn param(&mut self, name: &str, ty: TypeId) -> ValueId {
        let decl = self.program.push_decl(name, DeclKind::Param, ty, None);
        self.func.params.push(decl);
        self.push_value(ty, ValueKind::Parameter { decl })
    }

    /// Address of a package-level variable
    pub fn global(&mut self, decl: DeclId) -> ValueId {
        let Some(ty) = self.program.program.decl(decl).map(|d| d.ty) else {
            return self.opaque_on_error(format!("unknown global {}", decl));
        };
        let ptr = self.program.pointer(ty);
        self.push_value(ptr, ValueKind::Global { decl })
    }

    /// `&base.<field>` where `base` is a pointer to a struct
    pub fn field_addr(&mut self, base: ValueId, field: &str) -> ValueId {
        let Some(base_ty) = self.value_type(base) else {
            return self.opaque_on_error(format!("field_addr on unknown value {}", base));
        };
        let program = &self.program.program;
        let found = program.pointer_elem(base_ty).and_then(|s| {
            program
                .struct_fields(s)?
                .iter()
                .enumerate()
                .find_map(|(i, f)| {
                    let decl = program.decl(*f)?;
                    (decl.name == field).then_some((i, decl.ty))
                })
        });
        match found {
            Some((index, field_ty)) => {
                let ptr = self.program.pointer(field_ty);
                self.push_value(ptr, ValueKind::FieldAddr { base, field: index })
            }
            None => {
                let rendered = self.program.program.type_string(base_ty);
                self.opaque_on_error(format!("no field '{}' behind {}", field, rendered))
            }
        }
    }

    /// `*base`
    pub fn deref(&mut self, base: ValueId) -> ValueId {
        let elem = self
            .value_type(base)
            .and_then(|t| self.program.program.pointer_elem(t));
        match elem {
            Some(elem) => self.push_value(elem, ValueKind::Deref { base }),
            None => self.opaque_on_error(format!("deref of non-pointer {}", base)),
        }
    }

    /// `&base[i]` for a slice (or pointer to slice) `base`
    pub fn index_addr(&mut self, base: ValueId) -> ValueId {
        let elem = self.value_type(base).and_then(|t| {
            let program = &self.program.program;
            let collection = program.underlying(program.deref_once(t))?;
            match program.ty(collection)? {
                TypeKind::Slice { elem } => Some(*elem),
                _ => None,
            }
        });
        match elem {
            Some(elem) => {
                let ptr = self.program.pointer(elem);
                self.push_value(ptr, ValueKind::IndexAddr { base })
            }
            None => self.opaque_on_error(format!("index_addr of non-slice {}", base)),
        }
    }

    /// Value produced by a construct the analysis does not look through
    pub fn opaque(&mut self, ty: TypeId, description: &str) -> ValueId {
        self.push_value(
            ty,
            ValueKind::Opaque {
                description: description.to_string(),
            },
        )
    }

    // ------------------------------------------------------------------
    // Blocks & instructions
    // ------------------------------------------------------------------

    /// Append a new basic block; the first one is the entry block
    pub fn block(&mut self) -> BlockId {
        let id = BlockId::new(self.func.blocks.len());
        self.func.blocks.push(BasicBlock::new(id));
        id
    }

    fn push_instr(&mut self, block: BlockId, instr: Instruction) {
        match self.func.blocks.get_mut(block.index()) {
            Some(b) => b.instructions.push(instr),
            None => self.error(format!("instruction added to unknown block {}", block)),
        }
    }

    pub fn call(&mut self, block: BlockId, callee: FunctionId, args: &[ValueId], span: Span) {
        self.push_instr(
            block,
            Instruction::Call(CallInstr {
                callee: Callee::Static(callee),
                args: args.to_vec(),
                span,
            }),
        );
    }

    /// Call through an interface value or function variable
    pub fn call_dynamic(&mut self, block: BlockId, args: &[ValueId], span: Span) {
        self.push_instr(
            block,
            Instruction::Call(CallInstr {
                callee: Callee::Dynamic,
                args: args.to_vec(),
                span,
            }),
        );
    }

    pub fn defer(&mut self, block: BlockId, callee: FunctionId, args: &[ValueId], span: Span) {
        self.push_instr(
            block,
            Instruction::Defer(CallInstr {
                callee: Callee::Static(callee),
                args: args.to_vec(),
                span,
            }),
        );
    }

    pub fn run_defers(&mut self, block: BlockId, span: Span) {
        self.push_instr(block, Instruction::RunDefers { span });
    }

    pub fn other(&mut self, block: BlockId, span: Span) {
        self.push_instr(block, Instruction::Other { span });
    }

    /// Control-flow edge `from -> to`
    pub fn jump(&mut self, from: BlockId, to: BlockId) {
        if to.index() >= self.func.blocks.len() {
            self.error(format!("edge to unknown block {}", to));
            return;
        }
        match self.func.blocks.get_mut(from.index()) {
            Some(b) => b.successors.push(to),
            None => self.error(format!("edge from unknown block {}", from)),
        }
    }

    /// Conditional edge set `from -> targets...`
    pub fn branch(&mut self, from: BlockId, targets: &[BlockId]) {
        for to in targets {
            self.jump(from, *to);
        }
    }

    /// Store the function; closures are linked to their parent here
    pub fn finish(self) -> FunctionId {
        let id = self.func.id;
        if let Some(parent) = self.func.parent {
            if self.program.pending.contains(&parent) {
                self.program
                    .errors
                    .push(format!("closure {} finished before its parent", id));
            } else if let Some(p) = self.program.program.functions.get_mut(parent.index()) {
                p.anon_funcs.push(id);
            }
        }
        self.program.pending.remove(&id);
        self.program.program.functions[id.index()] = self.func;
        id
    }
}
