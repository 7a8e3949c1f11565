//! Build Registry Use Case
//!
//! Runs every contract source into one builder, then freezes the result.
//! Sources are applied in order; on key clashes the later source wins.

use crate::errors::Result;
use crate::features::lock_contracts::{ContractRegistry, ContractRegistryBuilder, ContractSource};

/// Assemble the immutable registry from several sources
pub struct BuildRegistryUseCase {
    sources: Vec<Box<dyn ContractSource>>,
}

impl BuildRegistryUseCase {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl ContractSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn add_source(&mut self, source: Box<dyn ContractSource>) {
        self.sources.push(source);
    }

    pub fn execute(&self) -> Result<ContractRegistry> {
        let mut builder = ContractRegistryBuilder::new();
        for source in &self.sources {
            let before = builder.len();
            source.contribute(&mut builder)?;
            tracing::debug!(
                source = %source.describe(),
                added = builder.len().saturating_sub(before),
                "contracts loaded"
            );
        }
        let registry = builder.build();
        tracing::info!(
            functions = registry.functions().len(),
            guards = registry.data().len(),
            "contract registry frozen"
        );
        Ok(registry)
    }
}

impl Default for BuildRegistryUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::lock_contracts::{DataInvariant, FunctionContract, Requirement};

    #[test]
    fn test_later_source_wins() {
        let mut first = ContractRegistryBuilder::new();
        first.add_function("Audit", None, FunctionContract::new(vec![Requirement::requires("a")]));
        let mut second = ContractRegistryBuilder::new();
        second
            .add_function("Audit", None, FunctionContract::new(vec![Requirement::requires("b")]))
            .add_data_invariant("total", DataInvariant::new("mu"));

        let registry = BuildRegistryUseCase::new()
            .with_source(first.build())
            .with_source(second.build())
            .execute()
            .unwrap();

        assert_eq!(registry.function("Audit").unwrap().requirements[0].target, "b");
        assert!(registry.guard_for("total").is_some());
    }
}
