//! Whole-project lookup over `out/build-info/*.json`.

use std::path::{Path, PathBuf};

use crate::config::ProjectLayout;
use crate::discovery::ensure_built;
use crate::error::{ArtifactError, Result};
use crate::ir::metadata::short_version;
use crate::ir::BuildRecord;

use super::VerificationInput;

/// Find the build record that produced `contract` and return its input.
///
/// With `source_path`, only a record whose output manifest holds that exact
/// `(source_path, contract)` pair is accepted, which tells apart
/// identically named contracts in different files. Without it, the first
/// record naming the contract wins; if none names it, the first valid
/// record is returned.
pub fn get_verification_input(
    root: &Path,
    layout: &ProjectLayout,
    contract: &str,
    source_path: Option<&str>,
) -> Result<VerificationInput> {
    ensure_built(root, layout)?;
    let mut records = build_records(&layout.build_info_dir(root))?;

    let selected = match source_path {
        Some(source) => records.find(|(_, record)| record.produced(source, contract)),
        None => select_by_name(records, contract),
    };

    let (path, record) = selected.ok_or_else(|| ArtifactError::BuildInfoNotFound {
        contract: contract.to_string(),
        source_path: source_path.map(|s| s.to_string()),
    })?;

    if short_version(&record.solc_long_version).is_none() {
        tracing::warn!(
            path = %path.display(),
            version = %record.solc_long_version,
            "build record has an unrecognized compiler version"
        );
    }
    tracing::debug!(path = %path.display(), contract, "selected build record");

    Ok(VerificationInput {
        standard_json: serde_json::to_vec(&record.standard_json_input())?,
        compiler_version: record.solc_long_version,
        build_id: Some(record.id).filter(|id| !id.is_empty()),
    })
}

fn select_by_name(
    records: impl Iterator<Item = (PathBuf, BuildRecord)>,
    contract: &str,
) -> Option<(PathBuf, BuildRecord)> {
    let mut first_valid = None;
    let mut naming: Option<(PathBuf, BuildRecord)> = None;

    for (path, record) in records {
        if record.sources_defining(contract).next().is_some() {
            if let Some((first, _)) = &naming {
                tracing::warn!(
                    contract,
                    path = %first.display(),
                    "several build records define this contract, pass a source path to disambiguate"
                );
                break;
            }
            naming = Some((path, record));
        } else if first_valid.is_none() && naming.is_none() {
            first_valid = Some((path, record));
        }
    }

    if naming.is_some() {
        return naming;
    }
    let first = first_valid?;
    tracing::warn!(
        contract,
        path = %first.0.display(),
        "no build record names this contract, falling back to the first one"
    );
    Some(first)
}

/// Structurally valid build records in file name order, decoded lazily.
///
/// Listing the directory can fail. A file that cannot be read or decoded is
/// skipped, so one corrupt record never hides the others.
pub fn build_records(dir: &Path) -> Result<impl Iterator<Item = (PathBuf, BuildRecord)>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| read_build_record(&path).map(|record| (path, record))))
}

fn read_build_record(path: &Path) -> Option<BuildRecord> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable build record, skipping");
            return None;
        }
    };
    match serde_json::from_slice::<BuildRecord>(&content) {
        Ok(record) if record.is_structurally_valid() => Some(record),
        Ok(_) => {
            tracing::debug!(path = %path.display(), "build record lacks input or version, skipping");
            None
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unparsable build record, skipping");
            None
        }
    }
}
