//! Minimal per-contract Standard JSON Input, rebuilt from metadata.
//!
//! The metadata hash at the end of the bytecode covers exactly the sources
//! that were in the compilation unit. A whole-project build record carries
//! unrelated files and would hash differently, so this input holds only the
//! sources the contract's own metadata declares.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ArtifactError, Result};
use crate::ir::metadata::{CompilerMetadata, MetadataEncoding, OptimizerSettings};
use crate::ir::standard_json::{default_output_selection, InputSettings, SourceContent};
use crate::ir::StandardJsonInput;
use crate::parser;

use super::VerificationInput;

const DEFAULT_LANGUAGE: &str = "Solidity";

/// Run count the build tool leaves out when it equals the compiler default.
const DEFAULT_OPTIMIZER_RUNS: u64 = 200;

const DEFAULT_BYTECODE_HASH: &str = "ipfs";

/// Rebuild the Standard JSON Input for one artifact.
///
/// Source files are re-read relative to `root`. Nothing partial is ever
/// returned: missing or unparsable metadata, an empty source list, or any
/// missing source file is an error.
pub fn generate_standard_json(root: &Path, artifact_path: &Path) -> Result<VerificationInput> {
    let artifact = parser::load_artifact(artifact_path)?;
    if artifact.is_interface() {
        return Err(ArtifactError::NoBytecode(parser::contract_name(artifact_path)));
    }
    let metadata = parser::load_metadata(artifact_path, &artifact)?;
    if metadata.sources.is_empty() {
        return Err(ArtifactError::EmptySources(artifact_path.display().to_string()));
    }

    let input = reconstruct_input(root, &metadata)?;
    tracing::debug!(
        artifact = %artifact_path.display(),
        sources = input.sources.len(),
        "reconstructed standard json input"
    );

    Ok(VerificationInput {
        standard_json: serde_json::to_vec(&input)?,
        compiler_version: metadata.compiler.version.clone(),
        build_id: None,
    })
}

/// Standard JSON Input for the compilation unit `metadata` describes.
pub fn reconstruct_input(root: &Path, metadata: &CompilerMetadata) -> Result<StandardJsonInput> {
    let mut sources = BTreeMap::new();
    for declared in metadata.sources.keys() {
        let full = root.join(declared);
        if !full.is_file() {
            return Err(ArtifactError::MissingSource(PathBuf::from(declared)));
        }
        let content = std::fs::read_to_string(&full)?;
        sources.insert(declared.clone(), SourceContent { content });
    }

    let recorded = &metadata.settings;
    let settings = InputSettings {
        optimizer: optimizer_settings(recorded.optimizer),
        evm_version: recorded.evm_version.clone().filter(|v| !v.is_empty()),
        via_ir: recorded.via_ir.filter(|&enabled| enabled),
        libraries: nest_libraries(&recorded.libraries),
        remappings: recorded.remappings.clone(),
        metadata: Some(metadata_encoding(recorded.metadata.as_ref())),
        output_selection: default_output_selection(),
    };

    Ok(StandardJsonInput {
        language: metadata
            .language
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        sources,
        settings,
    })
}

/// An enabled optimizer recorded with zero runs means the default was
/// omitted. A disabled optimizer keeps whatever was recorded.
fn optimizer_settings(recorded: OptimizerSettings) -> OptimizerSettings {
    if recorded.enabled && recorded.runs == 0 {
        OptimizerSettings {
            enabled: true,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    } else {
        recorded
    }
}

fn metadata_encoding(recorded: Option<&MetadataEncoding>) -> MetadataEncoding {
    match recorded {
        Some(encoding) => encoding.clone(),
        None => MetadataEncoding {
            bytecode_hash: Some(DEFAULT_BYTECODE_HASH.to_string()),
            ..Default::default()
        },
    }
}

/// Metadata records libraries flat as `path:Name → address`; the compiler
/// input wants `path → Name → address`. Nested entries pass unchanged.
fn nest_libraries(
    recorded: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut nested: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (key, value) in recorded {
        match value {
            serde_json::Value::String(address) => {
                let (file, name) = key.rsplit_once(':').unwrap_or(("", key.as_str()));
                nested
                    .entry(file.to_string())
                    .or_default()
                    .insert(name.to_string(), address.clone());
            }
            serde_json::Value::Object(libs) => {
                let entry = nested.entry(key.clone()).or_default();
                for (name, address) in libs {
                    if let Some(address) = address.as_str() {
                        entry.insert(name.clone(), address.to_string());
                    }
                }
            }
            other => {
                tracing::debug!(library = %key, value = %other, "ignoring library entry of unexpected shape");
            }
        }
    }
    nested
}
