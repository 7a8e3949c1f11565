//! End-to-end lockset scenarios over the banking fixture
//!
//! Each test builds a small program, a contract table, and checks the exact
//! diagnostics the analysis reports.

mod common;

use common::*;
use lockcheck_ir::features::lockset_analysis::LockIdentity;
use lockcheck_ir::features::program_model::{BlockId, FunctionId, Program};
use lockcheck_ir::{AnalysisConfig, ContractRegistry, LocksetAnalysisUseCase, ProgramBuilder};
use pretty_assertions::assert_eq;

fn analyze(program: &Program, registry: &ContractRegistry) -> Vec<lockcheck_ir::Diagnostic> {
    LocksetAnalysisUseCase::new()
        .analyze(program, registry)
        .diagnostics
        .into_vec()
}

/// `func TransferUnsafe(from, to *Account, amount int)`
fn transfer_unsafe(b: &mut ProgramBuilder, t: &BankTypes) -> FunctionId {
    let mut f = b.function("TransferUnsafe");
    f.at(BANK_FILE, line(10));
    f.param("from", t.account_ptr);
    f.param("to", t.account_ptr);
    f.param("amount", t.int);
    let entry = f.block();
    f.other(entry, line(11));
    f.finish()
}

/// `func credit(a *Account)` requiring `a.mu`
fn credit(b: &mut ProgramBuilder, t: &BankTypes) -> FunctionId {
    let mut f = b.function("credit");
    f.param("a", t.account_ptr);
    let entry = f.block();
    f.other(entry, line(5));
    f.finish()
}

fn transfer_contracts() -> Contracts {
    Contracts::new().requires("TransferUnsafe", None, &["from.mu", "to.mu"])
}

fn account_mu(program: &Program, t: &BankTypes) -> LockIdentity {
    LockIdentity::new(program.field_named(t.account, "mu").unwrap().id)
}

// ═══════════════════════════════════════════════════════════════════════════
// Requirements at call sites
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_bad_transfer_reports_each_missing_lock_at_the_call() {
    let (mut b, t) = bank_package();
    let unsafe_fn = transfer_unsafe(&mut b, &t);

    let mut f = b.function("BadTransfer");
    f.at(BANK_FILE, line(38));
    let from = f.param("from", t.account_ptr);
    let to = f.param("to", t.account_ptr);
    let amount = f.param("amount", t.int);
    let entry = f.block();
    f.call(entry, unsafe_fn, &[from, to, amount], line(40));
    f.finish();

    let program = b.build().unwrap();
    let diagnostics = analyze(&program, &transfer_contracts().build());

    assert_eq!(targets(&diagnostics), vec!["from.mu", "to.mu"]);
    assert_eq!(lines(&diagnostics), vec![40, 40]);
    for d in &diagnostics {
        assert_eq!(d.function, "bank.BadTransfer");
        assert_eq!(d.callee, "TransferUnsafe");
        assert_eq!(d.file_path.as_deref(), Some(BANK_FILE));
    }
    assert_eq!(
        diagnostics[0].message,
        "call to TransferUnsafe requires lock from.mu, but it is not held"
    );
}

#[test]
fn test_good_transfer_with_deferred_unlocks_is_clean() {
    let (mut b, t) = bank_package();
    let unsafe_fn = transfer_unsafe(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("GoodTransfer");
    let from = f.param("from", t.account_ptr);
    let to = f.param("to", t.account_ptr);
    let amount = f.param("amount", t.int);
    let from_mu = f.field_addr(from, "mu");
    let to_mu = f.field_addr(to, "mu");
    let entry = f.block();
    f.call(entry, sync.lock, &[from_mu], line(20));
    f.defer(entry, sync.unlock, &[from_mu], line(21));
    f.call(entry, sync.lock, &[to_mu], line(22));
    f.defer(entry, sync.unlock, &[to_mu], line(23));
    f.call(entry, unsafe_fn, &[from, to, amount], line(24));
    f.run_defers(entry, line(25));
    f.finish();

    let program = b.build().unwrap();
    assert!(analyze(&program, &transfer_contracts().build()).is_empty());
}

#[test]
fn test_locks_are_identified_per_field_declaration() {
    // from.mu and to.mu are the same field of Account, so holding one
    // satisfies both requirements.
    let (mut b, t) = bank_package();
    let unsafe_fn = transfer_unsafe(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("HalfLockedTransfer");
    let from = f.param("from", t.account_ptr);
    let to = f.param("to", t.account_ptr);
    let amount = f.param("amount", t.int);
    let from_mu = f.field_addr(from, "mu");
    let entry = f.block();
    f.call(entry, sync.lock, &[from_mu], line(30));
    f.call(entry, unsafe_fn, &[from, to, amount], line(31));
    f.call(entry, sync.unlock, &[from_mu], line(32));
    f.finish();

    let program = b.build().unwrap();
    assert!(analyze(&program, &transfer_contracts().build()).is_empty());
}

#[test]
fn test_initial_lockset_covers_callers_requirements() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);

    // TransferUnsafe itself calls credit(from) under its own contract
    let mut f = b.function("TransferUnsafe");
    let from = f.param("from", t.account_ptr);
    f.param("to", t.account_ptr);
    let entry = f.block();
    f.call(entry, credit_fn, &[from], line(12));
    f.finish();

    let program = b.build().unwrap();
    let registry = transfer_contracts()
        .requires("credit", None, &["a.mu"])
        .build();
    assert!(analyze(&program, &registry).is_empty());
}

#[test]
fn test_read_lock_with_deferred_read_unlock() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut peek = b.function("peekBalance");
    peek.param("a", t.account_ptr);
    let entry = peek.block();
    peek.other(entry, line(3));
    let peek_fn = peek.finish();

    let mut f = b.function("ReadBalance");
    let a = f.param("a", t.account_ptr);
    let rw = f.field_addr(a, "rw");
    let entry = f.block();
    f.call(entry, sync.rlock, &[rw], line(50));
    f.defer(entry, sync.runlock, &[rw], line(51));
    f.call(entry, peek_fn, &[a], line(52));
    f.run_defers(entry, line(53));
    let read = f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("peekBalance", None, &["a.rw"])
        .build();
    assert!(analyze(&program, &registry).is_empty());

    let facts = LocksetAnalysisUseCase::new()
        .function_facts(&program, &registry, read)
        .unwrap();
    let exit = facts.exit_state(BlockId::new(0)).unwrap();
    assert!(exit.held.is_empty());
    assert!(exit.deferred_release.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Control flow
// ═══════════════════════════════════════════════════════════════════════════

/// `if cond { a.mu.Lock() } else { ... }; credit(a)`
fn branchy(lock_in_else: bool) -> (Program, ContractRegistry) {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("MaybeLocked");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    let then_b = f.block();
    let else_b = f.block();
    let join = f.block();
    f.other(entry, line(60));
    f.branch(entry, &[then_b, else_b]);
    f.call(then_b, sync.lock, &[mu], line(61));
    f.jump(then_b, join);
    if lock_in_else {
        f.call(else_b, sync.lock, &[mu], line(63));
    } else {
        f.other(else_b, line(63));
    }
    f.jump(else_b, join);
    f.call(join, credit_fn, &[a], line(65));
    f.finish();

    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    (b.build().unwrap(), registry)
}

#[test]
fn test_lock_on_one_branch_is_not_held_after_join() {
    let (program, registry) = branchy(false);
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![65]);
    assert_eq!(targets(&diagnostics), vec!["a.mu"]);
}

#[test]
fn test_lock_on_every_branch_is_held_after_join() {
    let (program, registry) = branchy(true);
    assert!(analyze(&program, &registry).is_empty());
}

#[test]
fn test_join_keeps_only_locks_held_on_every_path() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut f = b.function("TwoLocks");
    let a = f.param("a", t.account_ptr);
    let v = f.param("v", t.vault_ptr);
    let a_mu = f.field_addr(a, "mu");
    let v_mu = f.field_addr(v, "mu");
    let entry = f.block();
    let both = f.block();
    let one = f.block();
    let join = f.block();
    f.branch(entry, &[both, one]);
    f.call(both, sync.lock, &[a_mu], line(66));
    f.call(both, sync.lock, &[v_mu], line(67));
    f.jump(both, join);
    f.call(one, sync.lock, &[a_mu], line(68));
    f.jump(one, join);
    f.other(join, line(69));
    let id = f.finish();

    let program = b.build().unwrap();
    let facts = LocksetAnalysisUseCase::new()
        .function_facts(&program, &ContractRegistry::empty(), id)
        .unwrap();

    let expected: lockcheck_ir::LockSet = [account_mu(&program, &t)].into_iter().collect();
    assert_eq!(facts.exit_state(BlockId::new(1)).unwrap().held.len(), 2);
    assert_eq!(facts.entry_state(BlockId::new(3)).unwrap().held, expected);
}

/// Lock, defer the unlock on `defer_on` of two branches, then
/// `credit(a); return; credit(a)` in the join block
fn deferred_join(defer_on: &[usize]) -> (Program, ContractRegistry, FunctionId, LockIdentity) {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("Batched");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    let arms = [f.block(), f.block()];
    let join = f.block();
    f.call(entry, sync.lock, &[mu], line(70));
    f.branch(entry, &arms);
    for (i, arm) in arms.iter().enumerate() {
        if defer_on.contains(&i) {
            f.defer(*arm, sync.unlock, &[mu], line(71 + i as u32));
        } else {
            f.other(*arm, line(71 + i as u32));
        }
        f.jump(*arm, join);
    }
    f.call(join, credit_fn, &[a], line(75));
    f.run_defers(join, line(76));
    f.call(join, credit_fn, &[a], line(77));
    let id = f.finish();

    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    let program = b.build().unwrap();
    let mu = account_mu(&program, &t);
    (program, registry, id, mu)
}

#[test]
fn test_deferred_unlock_takes_effect_at_return_marker() {
    let (program, registry, id, mu) = deferred_join(&[0, 1]);
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![77]);

    let facts = LocksetAnalysisUseCase::new()
        .function_facts(&program, &registry, id)
        .unwrap();
    let join = facts.entry_state(BlockId::new(3)).unwrap();
    assert!(join.held.contains(&mu));
    assert!(join.deferred_release.contains(&mu));
}

#[test]
fn test_deferred_unlock_on_one_branch_is_dropped_at_join() {
    let (program, registry, _, _) = deferred_join(&[0]);
    assert!(analyze(&program, &registry).is_empty());
}

#[test]
fn test_loop_reports_once_per_call_site() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("DrainLoop");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    let header = f.block();
    let body = f.block();
    let exit = f.block();
    f.call(entry, sync.lock, &[mu], line(80));
    f.jump(entry, header);
    f.call(header, credit_fn, &[a], line(81));
    f.branch(header, &[body, exit]);
    f.call(body, sync.unlock, &[mu], line(82));
    f.jump(body, header);
    f.other(exit, line(84));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![81]);
}

#[test]
fn test_unreachable_block_is_not_reported() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);

    let mut f = b.function("DeadCode");
    let a = f.param("a", t.account_ptr);
    let entry = f.block();
    let dead = f.block();
    f.other(entry, line(90));
    f.call(dead, credit_fn, &[a], line(91));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    assert!(analyze(&program, &registry).is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Lock primitives
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_double_lock_single_unlock_releases() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("Relock");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    f.call(entry, sync.lock, &[mu], line(100));
    f.call(entry, sync.lock, &[mu], line(101));
    f.call(entry, credit_fn, &[a], line(102));
    f.call(entry, sync.unlock, &[mu], line(103));
    f.call(entry, credit_fn, &[a], line(104));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    assert_eq!(lines(&analyze(&program, &registry)), vec![104]);
}

#[test]
fn test_unlock_of_unheld_lock_is_a_no_op() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut f = b.function("StrayUnlock");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    f.call(entry, sync.unlock, &[mu], line(110));
    let id = f.finish();

    let program = b.build().unwrap();
    let registry = ContractRegistry::empty();
    assert!(analyze(&program, &registry).is_empty());
    let facts = LocksetAnalysisUseCase::new()
        .function_facts(&program, &registry, id)
        .unwrap();
    assert!(facts.exit_state(BlockId::new(0)).unwrap().is_empty());
}

#[test]
fn test_lock_through_opaque_value_is_ignored() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;
    let mutex_ptr = b.pointer(sync.mutex);

    let mut f = b.function("LockFromMap");
    let a = f.param("a", t.account_ptr);
    let mu = f.opaque(mutex_ptr, "locks[key]");
    let entry = f.block();
    f.call(entry, sync.lock, &[mu], line(120));
    f.call(entry, credit_fn, &[a], line(121));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    assert_eq!(lines(&analyze(&program, &registry)), vec![121]);
}

#[test]
fn test_returns_contract_is_applied_only_when_enabled() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);

    let mut open = b.function("OpenAccount");
    open.param("a", t.account_ptr);
    let entry = open.block();
    open.other(entry, line(130));
    let open_fn = open.finish();

    let mut f = b.function("OpenAndCredit");
    let a = f.param("a", t.account_ptr);
    let entry = f.block();
    f.call(entry, open_fn, &[a], line(131));
    f.call(entry, credit_fn, &[a], line(132));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("credit", None, &["a.mu"])
        .returns("OpenAccount", None, &["a.mu"])
        .build();

    assert_eq!(lines(&analyze(&program, &registry)), vec![132]);

    let propagating =
        LocksetAnalysisUseCase::with_config(AnalysisConfig::default().with_propagate_returns(true))
            .unwrap();
    assert!(propagating.analyze(&program, &registry).diagnostics.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Unchecked calls
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unresolvable_target_is_never_held() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut g = b.function("ghostly");
    g.param("a", t.account_ptr);
    let entry = g.block();
    g.other(entry, line(140));
    let ghostly = g.finish();

    let mut f = b.function("CallsGhostly");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    f.call(entry, sync.lock, &[mu], line(141));
    f.call(entry, ghostly, &[a], line(142));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("ghostly", None, &["ghost.mu", "a.nosuchfield"])
        .build();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(targets(&diagnostics), vec!["ghost.mu", "a.nosuchfield"]);
    assert_eq!(lines(&diagnostics), vec![142, 142]);
}

#[test]
fn test_dynamic_and_uncontracted_calls_are_unchecked() {
    let (mut b, t) = bank_package();

    let mut h = b.function("helper");
    h.param("a", t.account_ptr);
    let entry = h.block();
    h.other(entry, line(150));
    let helper = h.finish();

    let mut f = b.function("Dispatch");
    let a = f.param("a", t.account_ptr);
    let entry = f.block();
    f.call_dynamic(entry, &[a], line(151));
    f.call(entry, helper, &[a], line(152));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    assert!(analyze(&program, &registry).is_empty());
}

#[test]
fn test_body_less_function_is_skipped() {
    let (mut b, t) = bank_package();
    b.function("External").finish();
    let credit_fn = credit(&mut b, &t);

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("External", None, &["registryMu"])
        .requires("credit", None, &["a.mu"])
        .build();
    let outcome = LocksetAnalysisUseCase::new().analyze(&program, &registry);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.functions_analyzed, 1);

    let facts = LocksetAnalysisUseCase::new()
        .function_facts(&program, &registry, credit_fn)
        .unwrap();
    assert!(facts.is_reachable(BlockId::new(0)));
}

// ═══════════════════════════════════════════════════════════════════════════
// Function literals
// ═══════════════════════════════════════════════════════════════════════════

fn outer_with_closure() -> (Program, ContractRegistry) {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;

    let mut f = b.function("Outer");
    let a = f.param("a", t.account_ptr);
    let mu = f.field_addr(a, "mu");
    let entry = f.block();
    f.call(entry, sync.lock, &[mu], line(160));
    f.call(entry, credit_fn, &[a], line(161));
    f.call(entry, sync.unlock, &[mu], line(163));
    let outer = f.finish();

    let mut c = b.closure(outer, "Outer$1");
    let captured = c.param("a", t.account_ptr);
    let entry = c.block();
    c.call(entry, credit_fn, &[captured], line(162));
    c.finish();

    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();
    (b.build().unwrap(), registry)
}

#[test]
fn test_function_literal_starts_with_no_locks() {
    let (program, registry) = outer_with_closure();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![162]);
    assert_eq!(diagnostics[0].function, "bank.Outer$1");
}

#[test]
fn test_function_literals_can_be_excluded() {
    let (program, registry) = outer_with_closure();
    let config = AnalysisConfig::default().with_nested_functions(false);
    let outcome = LocksetAnalysisUseCase::with_config(config)
        .unwrap()
        .analyze(&program, &registry);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.functions_analyzed, 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Target resolution
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_receiver_relative_path_through_pointer_field() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut m = b.method("auditVault", "b", t.bank_ptr);
    let entry = m.block();
    m.other(entry, line(170));
    let audit_vault = m.finish();

    for (name, lock, at) in [("Audit", true, 180), ("AuditUnlocked", false, 190)] {
        let mut f = b.method(name, "b", t.bank_ptr);
        let recv = f.receiver_value().unwrap();
        let vault = f.field_addr(recv, "vault");
        let vault_ptr = f.deref(vault);
        let mu = f.field_addr(vault_ptr, "mu");
        let entry = f.block();
        if lock {
            f.call(entry, sync.lock, &[mu], line(at));
        }
        f.call(entry, audit_vault, &[recv], line(at + 1));
        if lock {
            f.call(entry, sync.unlock, &[mu], line(at + 2));
        }
        f.finish();
    }

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("auditVault", Some("*Bank"), &["b.vault.mu"])
        .build();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![191]);
    assert_eq!(diagnostics[0].function, "(*bank.Bank).AuditUnlocked");
    assert_eq!(diagnostics[0].target, "b.vault.mu");
}

#[test]
fn test_implicit_receiver_field_target() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut interest = b.method("applyInterest", "a", t.account_ptr);
    let entry = interest.block();
    interest.other(entry, line(200));
    let apply_interest = interest.finish();

    // depositUnsafe relies on its own requirement for applyInterest
    let mut d = b.method("depositUnsafe", "a", t.account_ptr);
    let recv = d.receiver_value().unwrap();
    d.param("amount", t.int);
    let entry = d.block();
    d.call(entry, apply_interest, &[recv], line(206));
    let deposit_unsafe = d.finish();

    let mut ok = b.method("Deposit", "a", t.account_ptr);
    let recv = ok.receiver_value().unwrap();
    let amount = ok.param("amount", t.int);
    let mu = ok.field_addr(recv, "mu");
    let entry = ok.block();
    ok.call(entry, sync.lock, &[mu], line(210));
    ok.defer(entry, sync.unlock, &[mu], line(211));
    ok.call(entry, deposit_unsafe, &[recv, amount], line(212));
    ok.run_defers(entry, line(213));
    ok.finish();

    let mut bad = b.method("BadCallDepositUnsafe", "a", t.account_ptr);
    let recv = bad.receiver_value().unwrap();
    let amount = bad.opaque(t.int, "100");
    let entry = bad.block();
    bad.call(entry, deposit_unsafe, &[recv, amount], line(220));
    bad.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("depositUnsafe", Some("*Account"), &["mu"])
        .requires("applyInterest", Some("*Account"), &["mu"])
        .build();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![220]);
    assert_eq!(diagnostics[0].callee, "depositUnsafe");
    assert_eq!(diagnostics[0].function, "(*bank.Account).BadCallDepositUnsafe");
}

#[test]
fn test_package_level_mutex() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut r = b.function("Register");
    let entry = r.block();
    r.other(entry, line(230));
    let register = r.finish();

    let mut f = b.function("RegisterTwice");
    let g = f.global(t.registry_mu);
    let entry = f.block();
    f.call(entry, sync.lock, &[g], line(240));
    f.call(entry, register, &[], line(241));
    f.call(entry, sync.unlock, &[g], line(242));
    f.call(entry, register, &[], line(243));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("Register", None, &["registryMu"])
        .build();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(lines(&diagnostics), vec![243]);
    assert_eq!(targets(&diagnostics), vec!["registryMu"]);
}

#[test]
fn test_receiver_field_shadows_package_variable() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut m = b.method("reindex", "b", t.bank_ptr);
    let entry = m.block();
    m.other(entry, line(250));
    let reindex = m.finish();

    // Holds the package-level registryMu, not Bank.registryMu
    let mut f = b.method("Reindex", "b", t.bank_ptr);
    let recv = f.receiver_value().unwrap();
    let g = f.global(t.registry_mu);
    let entry = f.block();
    f.call(entry, sync.lock, &[g], line(260));
    f.call(entry, reindex, &[recv], line(261));
    f.call(entry, sync.unlock, &[g], line(262));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("reindex", Some("*Bank"), &["registryMu"])
        .build();
    assert_eq!(lines(&analyze(&program, &registry)), vec![261]);
}

#[test]
fn test_indexed_lock_collapses_to_collection() {
    let (mut b, t) = bank_package();
    let sync = t.sync;

    let mut m = b.method("rebalanceShards", "b", t.bank_ptr);
    let entry = m.block();
    m.other(entry, line(270));
    let rebalance = m.finish();

    let mut f = b.method("Rebalance", "b", t.bank_ptr);
    let recv = f.receiver_value().unwrap();
    let shards = f.field_addr(recv, "shards");
    let slot = f.index_addr(shards);
    let entry = f.block();
    f.call(entry, sync.lock, &[slot], line(280));
    f.call(entry, rebalance, &[recv], line(281));
    f.call(entry, sync.unlock, &[slot], line(282));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("rebalanceShards", Some("*Bank"), &["b.shards"])
        .build();
    assert!(analyze(&program, &registry).is_empty());
}

#[test]
fn test_receiver_qualified_contract_wins_over_bare_name() {
    let (mut b, t) = bank_package();

    let mut v = b.method("close", "v", t.vault_ptr);
    let entry = v.block();
    v.other(entry, line(290));
    let vault_close = v.finish();

    let mut a = b.method("close", "a", t.account_ptr);
    let entry = a.block();
    a.other(entry, line(291));
    let account_close = a.finish();

    let mut f = b.function("CloseAll");
    let vault = f.param("v", t.vault_ptr);
    let account = f.param("a", t.account_ptr);
    let entry = f.block();
    f.call(entry, vault_close, &[vault], line(295));
    f.call(entry, account_close, &[account], line(296));
    f.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("close", Some("*Vault"), &["v.mu"])
        .requires("close", Some("*Account"), &["a.rw"])
        .build();
    let diagnostics = analyze(&program, &registry);
    assert_eq!(targets(&diagnostics), vec!["v.mu", "a.rw"]);
    assert_eq!(lines(&diagnostics), vec![295, 296]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Driver
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_value_receiver_method_is_analyzed_once() {
    let (mut b, t) = bank_package();

    let mut r = b.function("Register");
    let entry = r.block();
    r.other(entry, line(300));
    let register = r.finish();

    let mut s = b.method("Snapshot", "a", t.account);
    let entry = s.block();
    s.call(entry, register, &[], line(305));
    let snapshot = s.finish();

    let program = b.build().unwrap();
    let registry = Contracts::new()
        .requires("Register", None, &["registryMu"])
        .build();

    let use_case = LocksetAnalysisUseCase::new();
    let order = use_case.analysis_order(&program);
    assert_eq!(order.iter().filter(|id| **id == snapshot).count(), 1);

    let outcome = use_case.analyze(&program, &registry);
    assert_eq!(lines(outcome.diagnostics.as_slice()), vec![305]);
    assert_eq!(outcome.functions_analyzed, 2);
}

#[test]
fn test_analyze_single_function_by_name() {
    let (mut b, t) = bank_package();
    let unsafe_fn = transfer_unsafe(&mut b, &t);
    let mut f = b.function("BadTransfer");
    let from = f.param("from", t.account_ptr);
    let to = f.param("to", t.account_ptr);
    let amount = f.param("amount", t.int);
    let entry = f.block();
    f.call(entry, unsafe_fn, &[from, to, amount], line(40));
    f.finish();

    let program = b.build().unwrap();
    let registry = transfer_contracts().build();
    let use_case = LocksetAnalysisUseCase::new();

    assert_eq!(
        use_case
            .analyze_function_named(&program, &registry, "bank.BadTransfer")
            .unwrap()
            .len(),
        2
    );
    assert!(use_case
        .analyze_function_named(&program, &registry, "NoSuchFunction")
        .is_err());
}

#[test]
fn test_parallel_analysis_matches_sequential() {
    let (mut b, t) = bank_package();
    let credit_fn = credit(&mut b, &t);
    let sync = t.sync;

    for i in 0..48u32 {
        let mut f = b.function(&format!("Worker{}", i));
        let a = f.param("a", t.account_ptr);
        let mu = f.field_addr(a, "mu");
        let entry = f.block();
        if i % 3 != 0 {
            f.call(entry, sync.lock, &[mu], line(400 + i));
        }
        f.call(entry, credit_fn, &[a], line(500 + i));
        f.finish();
    }

    let program = b.build().unwrap();
    let registry = Contracts::new().requires("credit", None, &["a.mu"]).build();

    let sequential = LocksetAnalysisUseCase::new().analyze(&program, &registry);
    let parallel = LocksetAnalysisUseCase::with_config(AnalysisConfig::default().with_parallel(true))
        .unwrap()
        .analyze(&program, &registry);

    assert_eq!(sequential.diagnostics.len(), 16);
    assert_eq!(sequential, parallel);
}
