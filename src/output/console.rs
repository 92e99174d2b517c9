use crate::bytecode::{MatchKind, MatchResult};
use crate::discovery::{Candidate, DependencyCandidate, DiscoveryOutcome};
use crate::ir::ContractRecord;

use super::Report;

/// Render a report as plain console text.
pub fn render(report: Report<'_>) -> String {
    match report {
        Report::Discovery(candidates) => render_discovery(candidates),
        Report::Dependencies(deps) => render_dependencies(deps),
        Report::Contract(record) => render_contract(record),
        Report::Match(result) => render_match(result),
    }
}

fn render_discovery(candidates: &[Candidate]) -> String {
    let mut output = String::new();
    let included: Vec<&Candidate> = candidates.iter().filter(|c| c.is_included()).collect();

    if included.is_empty() {
        output.push_str("\n  No publishable contracts found.\n");
    } else {
        output.push_str(&format!("\n  {} contract(s) found:\n\n", included.len()));
        for candidate in &included {
            output.push_str(&format!(
                "  {:<28} {}\n",
                candidate.name,
                candidate.source_path.as_deref().unwrap_or("-")
            ));
        }
    }

    let excluded: Vec<&Candidate> = candidates.iter().filter(|c| !c.is_included()).collect();
    if !excluded.is_empty() {
        output.push_str(&format!("\n  {} excluded:\n\n", excluded.len()));
        for candidate in excluded {
            let why = match &candidate.outcome {
                DiscoveryOutcome::ExcludedByPolicy { reason } => reason.to_string(),
                DiscoveryOutcome::ExcludedUnreadable { error } => format!("unreadable: {error}"),
                DiscoveryOutcome::Included => continue,
            };
            output.push_str(&format!("  {:<28} {}\n", candidate.name, why));
        }
    }

    output.push('\n');
    output
}

fn render_dependencies(deps: &[DependencyCandidate]) -> String {
    if deps.is_empty() {
        return "\n  No dependency contracts found.\n\n".into();
    }
    let mut output = format!("\n  {} dependency contract(s):\n\n", deps.len());
    for dep in deps {
        output.push_str(&format!("  {:<28} {}\n", dep.name, dep.source_path));
    }
    output.push('\n');
    output
}

fn render_contract(record: &ContractRecord) -> String {
    let compiler = &record.compiler;
    let optimizer = if compiler.optimizer_enabled {
        format!("enabled, {} runs", compiler.optimizer_runs)
    } else {
        "disabled".into()
    };
    let code_len = record.bytecode.trim_start_matches("0x").len() / 2;

    let mut output = String::new();
    output.push_str(&format!("\n  {} ({})\n", record.name, record.chain));
    output.push_str(&format!("  source:    {}\n", or_dash(&record.source_path)));
    output.push_str(&format!(
        "  license:   {}\n",
        record.license.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!("  compiler:  {}\n", or_dash(&compiler.version)));
    output.push_str(&format!(
        "  evm:       {}\n",
        compiler.evm_version.as_deref().unwrap_or("default")
    ));
    output.push_str(&format!("  via-ir:    {}\n", compiler.via_ir));
    output.push_str(&format!("  optimizer: {optimizer}\n"));
    output.push_str(&format!("  bytecode:  {code_len} bytes\n\n"));
    output
}

fn render_match(result: &MatchResult) -> String {
    let tag = match result.kind {
        MatchKind::Full => "[FULL]   ",
        MatchKind::Partial => "[PARTIAL]",
        MatchKind::None => "[NONE]   ",
    };
    format!("\n  {} {}\n\n", tag, result.explanation)
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
