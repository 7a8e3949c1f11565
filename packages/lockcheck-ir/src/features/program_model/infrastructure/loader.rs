//! ProgramLoader - read a serialized program model
//!
//! External front-ends lower their language to the program model and hand it
//! over as JSON. Loading always validates, so the analysis never sees a
//! dangling id.

use std::path::Path;

use crate::errors::Result;
use crate::features::program_model::domain::Program;

pub struct ProgramLoader;

impl ProgramLoader {
    pub fn from_json_str(json: &str) -> Result<Program> {
        let program: Program = serde_json::from_str(json)?;
        program.validate()?;
        tracing::debug!(
            "loaded program '{}' ({} functions, {} types)",
            program.package,
            program.functions.len(),
            program.types.len()
        );
        Ok(program)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Program> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(program: &Program) -> Result<String> {
        Ok(serde_json::to_string_pretty(program)?)
    }
}
