//! Instruction Interpreter - the per-instruction transfer function
//!
//! | Instruction                 | Effect                                          |
//! |-----------------------------|-------------------------------------------------|
//! | acquire call                | `held ∪= {receiver}`                            |
//! | release call                | `held −= {receiver}`                            |
//! | defer acquire / release     | `deferred_acquire` / `deferred_release` += recv |
//! | run-deferred marker         | apply and clear the deferred batch              |
//! | other static call           | check every `requires` of the callee's contract |
//! | dynamic call, other         | nothing                                         |
//!
//! Checking emits into the sink only when one is supplied; the fixpoint
//! iterations run without a sink and the final pass runs with one.

use crate::features::lock_contracts::{AnnotationKind, ContractRegistry};
use crate::features::lockset_analysis::domain::{
    AnalysisState, Diagnostic, DiagnosticSink, LockIdentity, LockSet,
};
use crate::features::program_model::{BasicBlock, CallInstr, Function, Instruction, Program};

use super::lock_primitives::{LockOp, LockPrimitives};
use super::resolver::LockResolver;

pub struct Interpreter<'a> {
    program: &'a Program,
    registry: &'a ContractRegistry,
    primitives: &'a LockPrimitives,
    resolver: LockResolver<'a>,
    propagate_returns: bool,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        program: &'a Program,
        registry: &'a ContractRegistry,
        primitives: &'a LockPrimitives,
        propagate_returns: bool,
    ) -> Self {
        Self {
            program,
            registry,
            primitives,
            resolver: LockResolver::new(program),
            propagate_returns,
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Locks `func` may assume on entry: its own resolvable `requires` targets
    pub fn initial_lockset(&self, func: &Function) -> LockSet {
        let mut initial = LockSet::new();
        let Some(contract) = self.registry.contract_for(func, self.program) else {
            return initial;
        };
        for target in contract.targets(AnnotationKind::Requires) {
            match self.resolver.resolve_in_scope(func, target) {
                Some(lock) => {
                    tracing::debug!(
                        function = %func.name,
                        lock = %lock.describe(self.program),
                        "initialized path with lock"
                    );
                    initial.insert(lock);
                }
                None => tracing::debug!(
                    function = %func.name,
                    lock_target = target,
                    "could not resolve lock target, not assumed held"
                ),
            }
        }
        initial
    }

    /// Run every instruction of `block` over `state`
    pub fn run_block(
        &self,
        func: &Function,
        block: &BasicBlock,
        state: &mut AnalysisState,
        mut sink: Option<&mut DiagnosticSink>,
    ) {
        for instr in &block.instructions {
            self.step(func, instr, state, sink.as_deref_mut());
        }
    }

    pub fn step(
        &self,
        func: &Function,
        instr: &Instruction,
        state: &mut AnalysisState,
        sink: Option<&mut DiagnosticSink>,
    ) {
        match instr {
            Instruction::Call(call) => match self.lock_op(func, call) {
                Some((LockOp::Acquire, Some(lock))) => {
                    state.held.insert(lock);
                }
                Some((LockOp::Release, Some(lock))) => {
                    state.held.remove(&lock);
                }
                Some((_, None)) => {
                    tracing::trace!(function = %func.name, "lock operand not resolved");
                }
                None => self.check_call(func, call, state, sink),
            },
            Instruction::Defer(call) => match self.lock_op(func, call) {
                Some((LockOp::Acquire, Some(lock))) => {
                    state.deferred_acquire.insert(lock);
                }
                Some((LockOp::Release, Some(lock))) => {
                    state.deferred_release.insert(lock);
                }
                _ => {}
            },
            Instruction::RunDefers { .. } => state.apply_deferred(),
            Instruction::Other { .. } => {}
        }
    }

    /// Primitive kind of a call plus the lock its receiver traces to
    fn lock_op(&self, func: &Function, call: &CallInstr) -> Option<(LockOp, Option<LockIdentity>)> {
        let callee = self.program.function(call.static_callee()?)?;
        let op = self.primitives.classify(self.program, callee)?;
        let lock = call.receiver().and_then(|recv| self.resolver.trace(func, recv));
        Some((op, lock))
    }

    /// Check the callee's `requires` against `held`; dynamic calls are skipped
    fn check_call(
        &self,
        func: &Function,
        call: &CallInstr,
        state: &mut AnalysisState,
        mut sink: Option<&mut DiagnosticSink>,
    ) {
        let Some(callee) = call.static_callee().and_then(|id| self.program.function(id)) else {
            return;
        };
        let Some(contract) = self.registry.contract_for(callee, self.program) else {
            return;
        };

        for target in contract.targets(AnnotationKind::Requires) {
            let held = self
                .resolver
                .resolve_at_call_site(func, call, target)
                .is_some_and(|lock| state.held.contains(&lock));
            if held {
                continue;
            }
            if let Some(sink) = sink.as_deref_mut() {
                sink.warn(Diagnostic::missing_lock(
                    self.program.qualified_name(func),
                    func.file_path.clone(),
                    call.span,
                    callee.name.clone(),
                    target,
                ));
            }
        }

        if self.propagate_returns {
            for target in contract.targets(AnnotationKind::Returns) {
                if let Some(lock) = self.resolver.resolve_at_call_site(func, call, target) {
                    state.held.insert(lock);
                }
            }
        }
    }
}
