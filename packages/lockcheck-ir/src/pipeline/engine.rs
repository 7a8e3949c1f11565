//! LockcheckEngine - front-ends → registry → analysis → report

use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::lock_contracts::{
    BuildRegistryUseCase, ContractRegistry, GoSourceFiles, JsonContractFile,
};
use crate::features::lockset_analysis::LocksetAnalysisUseCase;
use crate::features::program_model::{Program, ProgramLoader};

use super::report::AnalysisReport;

pub struct LockcheckEngine {
    analysis: LocksetAnalysisUseCase,
    go_sources: Vec<PathBuf>,
    contract_files: Vec<PathBuf>,
}

impl LockcheckEngine {
    /// Fails if `config` does not validate
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            analysis: LocksetAnalysisUseCase::with_config(config)?,
            go_sources: Vec::new(),
            contract_files: Vec::new(),
        })
    }

    /// Annotated `.go` files to extract contracts from
    pub fn with_go_sources(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.go_sources.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Serialized registry; Go sources override its entries on key clashes
    pub fn with_contracts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.contract_files.push(path.into());
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.analysis.config()
    }

    /// Populate and freeze the registry
    pub fn build_registry(&self) -> Result<ContractRegistry> {
        let mut use_case = BuildRegistryUseCase::new();
        for path in &self.contract_files {
            use_case.add_source(Box::new(JsonContractFile::new(path.clone())));
        }
        if !self.go_sources.is_empty() {
            use_case.add_source(Box::new(GoSourceFiles::new(self.go_sources.clone())));
        }
        use_case.execute()
    }

    /// Analyze an in-memory program against an already built registry
    pub fn analyze(&self, program: &Program, registry: &ContractRegistry) -> AnalysisReport {
        let outcome = self.analysis.analyze(program, registry);
        AnalysisReport::new(&program.package, outcome)
    }

    /// Build the registry, then analyze `program`
    pub fn run(&self, program: &Program) -> Result<AnalysisReport> {
        let registry = self.build_registry()?;
        Ok(self.analyze(program, &registry))
    }

    /// Load a program JSON file, then `run`
    pub fn run_program_file(&self, path: impl AsRef<Path>) -> Result<AnalysisReport> {
        let program = ProgramLoader::from_path(path)?;
        self.run(&program)
    }
}
