//! Artifact discovery: which artifacts under `out/` are publishable.
//!
//! Walk errors abort discovery. An artifact that cannot be read or parsed
//! only excludes itself, so foreign JSON in the output tree never hides the
//! rest of the build.

pub mod policy;
pub mod suggest;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::ProjectLayout;
use crate::error::{ArtifactError, MissingDependency, Result};
use crate::parser;

pub use policy::{DiscoveryPolicy, ExclusionReason, PatternMatch};

/// One artifact file seen during discovery and what became of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub path: PathBuf,
    /// Known once the artifact was opened.
    pub source_path: Option<String>,
    pub outcome: DiscoveryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    Included,
    ExcludedByPolicy { reason: ExclusionReason },
    ExcludedUnreadable { error: String },
}

impl Candidate {
    pub fn is_included(&self) -> bool {
        matches!(self.outcome, DiscoveryOutcome::Included)
    }
}

/// A contract from outside the primary source tree that has code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCandidate {
    pub name: String,
    pub source_path: String,
    pub artifact_path: PathBuf,
}

/// Artifact paths under `root` that satisfy `policy`, in traversal order.
pub fn discover(root: &Path, layout: &ProjectLayout, policy: &DiscoveryPolicy) -> Result<Vec<PathBuf>> {
    Ok(discover_candidates(root, layout, policy)?
        .into_iter()
        .filter(Candidate::is_included)
        .map(|c| c.path)
        .collect())
}

/// Every candidate artifact with its policy outcome.
pub fn discover_candidates(
    root: &Path,
    layout: &ProjectLayout,
    policy: &DiscoveryPolicy,
) -> Result<Vec<Candidate>> {
    let artifacts = enumerate_artifacts(root, layout)?;
    let mut candidates = Vec::with_capacity(artifacts.len());

    for (name, path) in artifacts {
        let candidate = evaluate(layout, policy, name, path);
        match &candidate.outcome {
            DiscoveryOutcome::Included => {}
            DiscoveryOutcome::ExcludedByPolicy { reason } => {
                tracing::debug!(contract = %candidate.name, %reason, "excluded by policy");
            }
            DiscoveryOutcome::ExcludedUnreadable { error } => {
                tracing::debug!(
                    path = %candidate.path.display(),
                    error = %error,
                    "unreadable artifact, skipping"
                );
            }
        }
        candidates.push(candidate);
    }

    tracing::debug!(
        total = candidates.len(),
        included = candidates.iter().filter(|c| c.is_included()).count(),
        "discovery finished"
    );
    Ok(candidates)
}

fn evaluate(layout: &ProjectLayout, policy: &DiscoveryPolicy, name: String, path: PathBuf) -> Candidate {
    if let Err(reason) = policy.check_name(&name) {
        return Candidate {
            name,
            path,
            source_path: None,
            outcome: DiscoveryOutcome::ExcludedByPolicy { reason },
        };
    }

    let read = parser::load_artifact(&path).and_then(|artifact| {
        let source = parser::target_source_path(&path, &artifact)?;
        Ok((source, !artifact.is_interface()))
    });
    let (source_path, has_code) = match read {
        Ok(read) => read,
        Err(e) => {
            return Candidate {
                name,
                path,
                source_path: None,
                outcome: DiscoveryOutcome::ExcludedUnreadable {
                    error: e.to_string(),
                },
            }
        }
    };

    let outcome = match policy.check_source(layout, &name, &source_path) {
        Err(reason) => DiscoveryOutcome::ExcludedByPolicy { reason },
        Ok(()) if !has_code => DiscoveryOutcome::ExcludedByPolicy {
            reason: ExclusionReason::NoBytecode,
        },
        Ok(()) => DiscoveryOutcome::Included,
    };
    Candidate {
        name,
        path,
        source_path: Some(source_path),
        outcome,
    }
}

/// Contracts outside the primary source tree with nonempty bytecode.
pub fn dependency_candidates(root: &Path, layout: &ProjectLayout) -> Result<Vec<DependencyCandidate>> {
    let mut deps = Vec::new();
    for (name, path) in enumerate_artifacts(root, layout)? {
        let record = match parser::parse_artifact(&path) {
            Ok(record) => record,
            Err(ArtifactError::NoBytecode(_)) => continue,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable artifact, skipping");
                continue;
            }
        };
        if record.source_path.is_empty() || layout.is_primary_source(&record.source_path) {
            continue;
        }
        deps.push(DependencyCandidate {
            name,
            source_path: record.source_path,
            artifact_path: path,
        });
    }
    Ok(deps)
}

/// Resolve requested dependency names against the dependency candidates.
///
/// Fails with [`ArtifactError::UnknownDependencies`] naming every request
/// that has no case-insensitive match, each with ranked suggestions.
pub fn validate_dependencies(
    root: &Path,
    layout: &ProjectLayout,
    requested: &[String],
) -> Result<Vec<DependencyCandidate>> {
    let candidates = dependency_candidates(root, layout)?;
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for name in requested {
        match candidates.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            Some(candidate) => found.push(candidate.clone()),
            None => missing.push(MissingDependency {
                name: name.clone(),
                suggestions: suggest::suggest(name, candidates.iter().map(|c| c.name.as_str())),
            }),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(ArtifactError::UnknownDependencies(missing))
    }
}

/// Fail with an actionable error unless the project has been built with
/// build records. Returns the output directory.
pub fn ensure_built(root: &Path, layout: &ProjectLayout) -> Result<PathBuf> {
    let out = layout.out_dir(root);
    if !out.is_dir() {
        return Err(ArtifactError::OutputDirMissing(out));
    }
    let build_info = layout.build_info_dir(root);
    if !build_info.is_dir() {
        return Err(ArtifactError::BuildInfoMissing(build_info));
    }
    Ok(out)
}

/// `(contract name, artifact path)` for every artifact, sorted by path and
/// deduplicated by name with the first occurrence kept.
fn enumerate_artifacts(root: &Path, layout: &ProjectLayout) -> Result<Vec<(String, PathBuf)>> {
    let out = ensure_built(root, layout)?;
    let build_info = layout.build_info_dir(root);

    let walker = WalkDir::new(&out)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != build_info);

    let mut seen = HashSet::new();
    let mut artifacts = Vec::new();
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
            continue;
        }
        let in_source_dir = path
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|dir| layout.is_source_dir_name(&dir.to_string_lossy()));
        if !in_source_dir {
            continue;
        }

        let name = parser::contract_name(path);
        if !seen.insert(name.clone()) {
            tracing::debug!(contract = %name, path = %path.display(), "duplicate contract name, keeping first");
            continue;
        }
        artifacts.push((name, path.to_path_buf()));
    }
    Ok(artifacts)
}
