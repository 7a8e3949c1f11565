//! Lockset Analysis Use Case
//!
//! ## Algorithm
//! 1. Enumerate functions in package-member order: top-level functions, then
//!    for every declared type its value method set and pointer method set
//! 2. After each function, its function literals (depth-first) when enabled
//! 3. Analyze each function exactly once: initial lockset from its own
//!    `requires` (empty for function literals), worklist fixpoint, report
//! 4. Concatenate per-function diagnostics in enumeration order
//!
//! Per-function analyses share only the read-only program and registry, so
//! step 3 may run on the rayon pool without changing the output.

use rustc_hash::FxHashSet;

use crate::config::AnalysisConfig;
use crate::features::lock_contracts::ContractRegistry;
use crate::features::lockset_analysis::domain::{DiagnosticSink, LockSet};
use crate::features::lockset_analysis::infrastructure::error::{AnalysisError, Result};
use crate::features::lockset_analysis::infrastructure::{
    FixpointSolver, FunctionFacts, Interpreter, LockPrimitives,
};
use crate::features::program_model::{Function, FunctionId, Member, Program};

/// Diagnostics plus the number of function bodies analyzed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub diagnostics: DiagnosticSink,
    pub functions_analyzed: usize,
}

pub struct LocksetAnalysisUseCase {
    config: AnalysisConfig,
    primitives: LockPrimitives,
}

impl LocksetAnalysisUseCase {
    pub fn new() -> Self {
        let config = AnalysisConfig::default();
        Self {
            primitives: LockPrimitives::from_config(&config),
            config,
        }
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            primitives: LockPrimitives::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn interpreter<'a>(&'a self, program: &'a Program, registry: &'a ContractRegistry) -> Interpreter<'a> {
        Interpreter::new(program, registry, &self.primitives, self.config.propagate_returns)
    }

    /// Every function to analyze, each once, in enumeration order
    pub fn analysis_order(&self, program: &Program) -> Vec<FunctionId> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();

        for member in &program.members {
            match member {
                Member::Function(id) => self.enqueue(program, *id, &mut order, &mut seen),
                Member::Type(ty) => {
                    let local_values = program.value_method_set(*ty).into_iter().filter(|m| {
                        program
                            .function(*m)
                            .is_some_and(|f| f.package.as_deref() == Some(program.package.as_str()))
                    });
                    let methods: Vec<FunctionId> =
                        local_values.chain(program.pointer_method_set(*ty)).collect();
                    for method in methods {
                        self.enqueue(program, method, &mut order, &mut seen);
                    }
                }
                Member::Global(_) => {}
            }
        }
        order
    }

    fn enqueue(
        &self,
        program: &Program,
        id: FunctionId,
        order: &mut Vec<FunctionId>,
        seen: &mut FxHashSet<FunctionId>,
    ) {
        if !seen.insert(id) {
            return;
        }
        order.push(id);
        if !self.config.analyze_nested_functions {
            return;
        }
        if let Some(func) = program.function(id) {
            for nested in &func.anon_funcs {
                self.enqueue(program, *nested, order, seen);
            }
        }
    }

    fn run_one(&self, interpreter: &Interpreter, func: &Function) -> DiagnosticSink {
        let mut sink = DiagnosticSink::new();
        if !func.has_body() {
            return sink;
        }
        let initial = if func.is_anonymous() {
            LockSet::new()
        } else {
            interpreter.initial_lockset(func)
        };
        let facts = FixpointSolver::new(interpreter).analyze(func, initial, &mut sink);
        tracing::debug!(
            function = %interpreter.program().qualified_name(func),
            blocks = func.blocks.len(),
            iterations = facts.iterations,
            diagnostics = sink.len(),
            "function analyzed"
        );
        sink
    }

    /// Analyze the whole program
    pub fn analyze(&self, program: &Program, registry: &ContractRegistry) -> AnalysisOutcome {
        let order = self.analysis_order(program);
        let functions: Vec<&Function> = order.iter().filter_map(|id| program.function(*id)).collect();
        let interpreter = self.interpreter(program, registry);

        let sinks = self.run_all(&interpreter, &functions);

        let mut diagnostics = DiagnosticSink::new();
        for sink in sinks {
            diagnostics.extend(sink);
        }
        let functions_analyzed = functions.iter().filter(|f| f.has_body()).count();
        tracing::info!(
            package = %program.package,
            functions = functions_analyzed,
            diagnostics = diagnostics.len(),
            "lockset analysis complete"
        );
        AnalysisOutcome {
            diagnostics,
            functions_analyzed,
        }
    }

    #[cfg(feature = "parallel")]
    fn run_all(&self, interpreter: &Interpreter, functions: &[&Function]) -> Vec<DiagnosticSink> {
        use rayon::prelude::*;

        if self.config.parallel {
            functions
                .par_iter()
                .map(|func| self.run_one(interpreter, func))
                .collect()
        } else {
            functions.iter().map(|func| self.run_one(interpreter, func)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all(&self, interpreter: &Interpreter, functions: &[&Function]) -> Vec<DiagnosticSink> {
        functions.iter().map(|func| self.run_one(interpreter, func)).collect()
    }

    /// Analyze one function (its function literals are not included)
    pub fn analyze_function(
        &self,
        program: &Program,
        registry: &ContractRegistry,
        id: FunctionId,
    ) -> Result<DiagnosticSink> {
        let func = program
            .function(id)
            .ok_or_else(|| AnalysisError::FunctionNotFound(id.to_string()))?;
        Ok(self.run_one(&self.interpreter(program, registry), func))
    }

    /// Analyze the function whose qualified or plain name is `name`
    pub fn analyze_function_named(
        &self,
        program: &Program,
        registry: &ContractRegistry,
        name: &str,
    ) -> Result<DiagnosticSink> {
        let func = program
            .functions
            .iter()
            .find(|f| program.qualified_name(f) == name)
            .or_else(|| program.functions.iter().find(|f| f.name == name))
            .ok_or_else(|| AnalysisError::FunctionNotFound(name.to_string()))?;
        self.analyze_function(program, registry, func.id)
    }

    /// Converged block states of one function, for inspection
    pub fn function_facts(
        &self,
        program: &Program,
        registry: &ContractRegistry,
        id: FunctionId,
    ) -> Result<FunctionFacts> {
        let func = program
            .function(id)
            .ok_or_else(|| AnalysisError::FunctionNotFound(id.to_string()))?;
        let interpreter = self.interpreter(program, registry);
        let initial = if func.is_anonymous() {
            LockSet::new()
        } else {
            interpreter.initial_lockset(func)
        };
        Ok(FixpointSolver::new(&interpreter).solve(func, initial))
    }
}

impl Default for LocksetAnalysisUseCase {
    fn default() -> Self {
        Self::new()
    }
}
