//! Analysis report and its renderings

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::features::lockset_analysis::{AnalysisOutcome, Diagnostic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// `file:line:col: warning: message`, one per line
    #[default]
    Text,
    /// Pretty-printed JSON document
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub package: String,
    pub functions_analyzed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn new(package: impl Into<String>, outcome: AnalysisOutcome) -> Self {
        Self {
            package: package.into(),
            functions_analyzed: outcome.functions_analyzed,
            diagnostics: outcome.diagnostics.into_vec(),
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out.push_str(&format!(
            "{}: {} warning(s) in {} function(s) analyzed\n",
            self.package,
            self.diagnostics.len(),
            self.functions_analyzed
        ));
        out
    }
}
