/// Lockset analyzer port trait
use crate::features::lock_contracts::ContractRegistry;
use crate::features::lockset_analysis::application::{AnalysisOutcome, LocksetAnalysisUseCase};
use crate::features::lockset_analysis::domain::DiagnosticSink;
use crate::features::lockset_analysis::infrastructure::error::Result;
use crate::features::program_model::{FunctionId, Program};

/// Port trait for lock contract checkers
///
/// The registry is passed explicitly and only read; implementations hold no
/// process-wide state.
pub trait LocksetAnalyzerPort {
    /// Analyze every function of the program
    fn analyze_program(&self, program: &Program, registry: &ContractRegistry) -> AnalysisOutcome;

    /// Analyze a single function
    fn analyze_single(
        &self,
        program: &Program,
        registry: &ContractRegistry,
        function: FunctionId,
    ) -> Result<DiagnosticSink>;
}

impl LocksetAnalyzerPort for LocksetAnalysisUseCase {
    fn analyze_program(&self, program: &Program, registry: &ContractRegistry) -> AnalysisOutcome {
        self.analyze(program, registry)
    }

    fn analyze_single(
        &self,
        program: &Program,
        registry: &ContractRegistry,
        function: FunctionId,
    ) -> Result<DiagnosticSink> {
        self.analyze_function(program, registry, function)
    }
}
