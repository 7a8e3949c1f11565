//! LockResolver - dotted lock paths and SSA values to `LockIdentity`
//!
//! ## Rules
//! - `trace`: field-address, dereference and index-address are transparent;
//!   parameters and globals are roots; anything else is unresolved.
//!   `locks[i]` collapses to the identity of `locks` (no per-index precision).
//! - `resolve_in_scope`: first segment is a parameter (receiver included),
//!   else a field of the receiver's struct, else a package-level variable.
//!   Remaining segments descend the field chain, unwrapping one pointer per step.
//! - `resolve_at_call_site`: first segment names a formal of the callee →
//!   the actual argument at that position; else the path is taken relative
//!   to the receiver argument (methods only); else a package-level variable.
//!
//! Unresolved is `None`, which callers treat as "not held".

use crate::features::lockset_analysis::domain::LockIdentity;
use crate::features::program_model::{CallInstr, DeclId, Function, Program, TypeId, ValueId, ValueKind};

pub struct LockResolver<'p> {
    program: &'p Program,
}

impl<'p> LockResolver<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    /// Canonical identity of the lock `value` points at
    pub fn trace(&self, func: &Function, value: ValueId) -> Option<LockIdentity> {
        let mut current = value;
        // Each step moves to an operand defined earlier; bound it anyway.
        for _ in 0..=func.values.len() {
            let v = func.value(current)?;
            match &v.kind {
                ValueKind::FieldAddr { base, field } => {
                    let base_ty = func.value(*base)?.ty;
                    let strct = self.program.pointer_elem(base_ty)?;
                    let decl = self.program.struct_fields(strct)?.get(*field)?;
                    return Some(LockIdentity::new(*decl));
                }
                ValueKind::Deref { base } | ValueKind::IndexAddr { base } => current = *base,
                ValueKind::Parameter { decl } | ValueKind::Global { decl } => {
                    return Some(LockIdentity::new(*decl))
                }
                ValueKind::Opaque { .. } => return None,
            }
        }
        None
    }

    /// Resolve an annotation target inside `func` (its own contract)
    pub fn resolve_in_scope(&self, func: &Function, path: &str) -> Option<LockIdentity> {
        let segments = split_path(path)?;
        let (first, rest) = segments.split_first()?;
        let root = self.scope_decl(func, first)?;
        if rest.is_empty() {
            return Some(LockIdentity::new(root));
        }
        let root_ty = self.program.decl(root)?.ty;
        self.field_path_in_type(root_ty, rest)
    }

    /// Resolve a callee's annotation target at one call site inside `caller`
    pub fn resolve_at_call_site(
        &self,
        caller: &Function,
        call: &CallInstr,
        path: &str,
    ) -> Option<LockIdentity> {
        let callee = self.program.function(call.static_callee()?)?;
        let segments = split_path(path)?;
        let (first, rest) = segments.split_first()?;

        // A formal with no matching actual falls through to the receiver
        let actual = callee
            .params
            .iter()
            .position(|p| self.program.decl(*p).is_some_and(|d| d.name == *first))
            .and_then(|i| call.args.get(i).copied());
        if let Some(arg) = actual {
            return if rest.is_empty() {
                self.trace(caller, arg)
            } else {
                self.field_path_in_value(caller, arg, rest)
            };
        }

        if callee.is_method() {
            if let Some(recv) = call.receiver() {
                if let Some(found) = self.field_path_in_value(caller, recv, &segments) {
                    return Some(found);
                }
            }
        }

        let global = self.program.global_named(first)?;
        if rest.is_empty() {
            Some(LockIdentity::new(global.id))
        } else {
            self.field_path_in_type(global.ty, rest)
        }
    }

    /// Parameter, then receiver field, then package-level variable
    fn scope_decl(&self, func: &Function, name: &str) -> Option<DeclId> {
        if let Some(param) = func
            .params
            .iter()
            .find(|p| self.program.decl(**p).is_some_and(|d| d.name == name))
        {
            return Some(*param);
        }
        if let Some(recv) = func.receiver {
            let strct = self.program.deref_once(recv);
            if let Some(field) = self.program.field_named(strct, name) {
                return Some(field.id);
            }
        }
        self.program.global_named(name).map(|g| g.id)
    }

    fn field_path_in_type(&self, ty: TypeId, fields: &[&str]) -> Option<LockIdentity> {
        let mut current = ty;
        let mut found = None;
        for name in fields {
            let strct = self.program.deref_once(current);
            let field = self.program.field_named(strct, name)?;
            found = Some(field.id);
            current = field.ty;
        }
        found.map(LockIdentity::new)
    }

    fn field_path_in_value(&self, func: &Function, value: ValueId, fields: &[&str]) -> Option<LockIdentity> {
        if fields.is_empty() {
            return self.trace(func, value);
        }
        let ty = func.value(value)?.ty;
        self.field_path_in_type(ty, fields)
    }
}

/// `a.b.c` → `["a", "b", "c"]`; `None` for empty paths or empty segments
fn split_path(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.trim().split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::program_model::ProgramBuilder;
    use crate::shared::models::Span;

    struct Fixture {
        program: Program,
        deposit: crate::features::program_model::FunctionId,
        caller: crate::features::program_model::FunctionId,
    }

    /// `Account{mu, balance}`, `Bank{vault *Vault}`, `Vault{mu}`, global `registryMu`
    fn fixture() -> Fixture {
        let mut b = ProgramBuilder::new("bank");
        let sync = b.declare_sync_package();
        let int = b.basic("int");
        let account = b.struct_type("Account", &[("mu", sync.mutex), ("balance", int)]);
        let vault = b.struct_type("Vault", &[("mu", sync.mutex)]);
        let vault_ptr = b.pointer(vault);
        let bank = b.struct_type("Bank", &[("vault", vault_ptr)]);
        b.global("registryMu", sync.mutex);
        let account_ptr = b.pointer(account);
        let bank_ptr = b.pointer(bank);

        let mut m = b.method("depositUnsafe", "a", account_ptr);
        m.param("amount", int);
        m.block();
        let deposit = m.finish();

        let mut f = b.method("Audit", "bk", bank_ptr);
        let acc = f.param("acc", account_ptr);
        let amount = f.opaque(int, "const 1");
        let entry = f.block();
        f.call(entry, deposit, &[acc, amount], Span::at(20, 2));
        let caller = f.finish();

        Fixture {
            program: b.build().unwrap(),
            deposit,
            caller,
        }
    }

    fn name(program: &Program, id: Option<LockIdentity>) -> Option<String> {
        id.map(|l| l.describe(program))
    }

    #[test]
    fn test_in_scope_param_receiver_field_and_global() {
        let fx = fixture();
        let p = &fx.program;
        let deposit = p.function(fx.deposit).unwrap();
        let resolver = LockResolver::new(p);

        assert_eq!(name(p, resolver.resolve_in_scope(deposit, "a")), Some("a".into()));
        assert_eq!(name(p, resolver.resolve_in_scope(deposit, "mu")), Some("Account.mu".into()));
        assert_eq!(name(p, resolver.resolve_in_scope(deposit, "a.mu")), Some("Account.mu".into()));
        assert_eq!(
            name(p, resolver.resolve_in_scope(deposit, "registryMu")),
            Some("registryMu".into())
        );
        assert_eq!(resolver.resolve_in_scope(deposit, "a.nothing"), None);
        assert_eq!(resolver.resolve_in_scope(deposit, "ghost"), None);
        assert_eq!(resolver.resolve_in_scope(deposit, ""), None);
        assert_eq!(resolver.resolve_in_scope(deposit, "a..mu"), None);
    }

    #[test]
    fn test_in_scope_nested_field_through_pointer() {
        let fx = fixture();
        let p = &fx.program;
        let audit = p.function(fx.caller).unwrap();
        let resolver = LockResolver::new(p);

        assert_eq!(
            name(p, resolver.resolve_in_scope(audit, "bk.vault.mu")),
            Some("Vault.mu".into())
        );
        assert_eq!(name(p, resolver.resolve_in_scope(audit, "vault.mu")), Some("Vault.mu".into()));
    }

    #[test]
    fn test_call_site_maps_formals_to_actuals() {
        let fx = fixture();
        let p = &fx.program;
        let audit = p.function(fx.caller).unwrap();
        let resolver = LockResolver::new(p);
        let crate::features::program_model::Instruction::Call(call) = &audit.blocks[0].instructions[0]
        else {
            panic!("expected call");
        };

        // `a.mu` in the callee is `acc.mu` in the caller
        assert_eq!(
            name(p, resolver.resolve_at_call_site(audit, call, "a.mu")),
            Some("Account.mu".into())
        );
        // Bare `a` traces to the caller's parameter `acc`
        assert_eq!(name(p, resolver.resolve_at_call_site(audit, call, "a")), Some("acc".into()));
        // Not a formal: relative to the receiver argument
        assert_eq!(
            name(p, resolver.resolve_at_call_site(audit, call, "mu")),
            Some("Account.mu".into())
        );
        // Not a formal, not a receiver field: package-level variable
        assert_eq!(
            name(p, resolver.resolve_at_call_site(audit, call, "registryMu")),
            Some("registryMu".into())
        );
        assert_eq!(resolver.resolve_at_call_site(audit, call, "amount.mu"), None);
    }

    #[test]
    fn test_call_site_formal_without_actual_uses_receiver() {
        let mut b = ProgramBuilder::new("bank");
        let sync = b.declare_sync_package();
        let account = b.struct_type("Account", &[("mu", sync.mutex)]);
        let account_ptr = b.pointer(account);
        let mutex_ptr = b.pointer(sync.mutex);

        let mut m = b.method("Sweep", "a", account_ptr);
        m.param("mu", mutex_ptr);
        m.block();
        let sweep = m.finish();

        let mut f = b.function("Caller");
        let acc = f.param("acc", account_ptr);
        let entry = f.block();
        f.call(entry, sweep, &[acc], Span::at(9, 2));
        let caller = f.finish();

        let program = b.build().unwrap();
        let caller = program.function(caller).unwrap();
        let crate::features::program_model::Instruction::Call(call) = &caller.blocks[0].instructions[0]
        else {
            panic!("expected call");
        };
        let resolver = LockResolver::new(&program);

        assert_eq!(
            name(&program, resolver.resolve_at_call_site(caller, call, "mu")),
            Some("Account.mu".into())
        );
    }

    #[test]
    fn test_trace_through_deref_and_index() {
        let mut b = ProgramBuilder::new("p");
        let sync = b.declare_sync_package();
        let locks_ty = b.slice(sync.mutex);
        let locks_ptr = b.pointer(locks_ty);
        let mutex_ptr = b.pointer(sync.mutex);
        let ptr_ptr = b.pointer(mutex_ptr);

        let mut f = b.function("f");
        let locks = f.param("locks", locks_ptr);
        let slot = f.index_addr(locks);
        let pp = f.param("pp", ptr_ptr);
        let p = f.deref(pp);
        let opaque = f.opaque(mutex_ptr, "call result");
        f.block();
        let fid = f.finish();
        let program = b.build().unwrap();
        let func = program.function(fid).unwrap();
        let resolver = LockResolver::new(&program);

        assert_eq!(name(&program, resolver.trace(func, slot)), Some("locks".into()));
        assert_eq!(name(&program, resolver.trace(func, p)), Some("pp".into()));
        assert_eq!(resolver.trace(func, opaque), None);
    }
}
