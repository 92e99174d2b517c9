pub mod console;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::bytecode::MatchResult;
use crate::discovery::{Candidate, DependencyCandidate};
use crate::error::Result;
use crate::ir::ContractRecord;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Something the CLI can print.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    Discovery(&'a [Candidate]),
    Dependencies(&'a [DependencyCandidate]),
    Contract(&'a ContractRecord),
    Match(&'a MatchResult),
}

/// Render a report into the specified format.
pub fn render(report: Report<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Json => json::render(report),
    }
}
