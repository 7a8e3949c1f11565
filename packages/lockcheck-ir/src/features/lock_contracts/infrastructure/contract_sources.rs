//! ContractSource adapters: Go files and JSON registries

use std::path::PathBuf;

use super::go_contract_extractor::GoContractExtractor;
use crate::errors::Result;
use crate::features::lock_contracts::domain::{ContractRegistry, ContractRegistryBuilder};
use crate::features::lock_contracts::ports::ContractSource;

/// Annotated `.go` files
#[derive(Debug, Clone)]
pub struct GoSourceFiles {
    paths: Vec<PathBuf>,
}

impl GoSourceFiles {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl ContractSource for GoSourceFiles {
    fn describe(&self) -> String {
        format!("{} Go source file(s)", self.paths.len())
    }

    fn contribute(&self, builder: &mut ContractRegistryBuilder) -> Result<()> {
        let extractor = GoContractExtractor::new();
        for path in &self.paths {
            extractor.extract_file(path, builder)?;
        }
        Ok(())
    }
}

/// A registry previously written with `serde_json`
#[derive(Debug, Clone)]
pub struct JsonContractFile {
    path: PathBuf,
}

impl JsonContractFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContractSource for JsonContractFile {
    fn describe(&self) -> String {
        format!("contract registry {}", self.path.display())
    }

    fn contribute(&self, builder: &mut ContractRegistryBuilder) -> Result<()> {
        let text = std::fs::read_to_string(&self.path)?;
        let registry: ContractRegistry = serde_json::from_str(&text)?;
        builder.merge(registry);
        Ok(())
    }
}

/// Registry already held in memory
impl ContractSource for ContractRegistry {
    fn describe(&self) -> String {
        format!(
            "in-memory registry ({} functions, {} guards)",
            self.functions().len(),
            self.data().len()
        )
    }

    fn contribute(&self, builder: &mut ContractRegistryBuilder) -> Result<()> {
        builder.merge(self.clone());
        Ok(())
    }
}
