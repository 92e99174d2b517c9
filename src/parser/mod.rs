//! Artifact parser: one `out/<File>.sol/<Contract>.json` → `ContractRecord`.

use std::path::Path;

use crate::error::{ArtifactError, Result};
use crate::ir::{BuildArtifact, Chain, CompilerMetadata, CompilerSettings, ContractRecord};

/// Decode one artifact file into its canonical record.
///
/// Metadata that is missing or fails to decode is tolerated and yields
/// default metadata, since some pipelines strip it. Artifacts with no
/// bytecode fail with [`ArtifactError::NoBytecode`]; callers treat that as
/// "skip".
pub fn parse_artifact(path: &Path) -> Result<ContractRecord> {
    let name = contract_name(path);
    let artifact = load_artifact(path)?;

    if artifact.is_interface() {
        return Err(ArtifactError::NoBytecode(name));
    }

    let metadata = match artifact.embedded_metadata() {
        Some(Ok(metadata)) => metadata,
        Some(Err(e)) => {
            tracing::debug!(path = %path.display(), error = %e, "unparsable metadata, using defaults");
            CompilerMetadata::default()
        }
        None => {
            tracing::debug!(path = %path.display(), "artifact has no metadata");
            CompilerMetadata::default()
        }
    };

    let source_path = metadata
        .compilation_target()
        .map(|(source, _)| source.to_string())
        .unwrap_or_default();

    Ok(ContractRecord {
        name,
        chain: Chain::Evm,
        source_path,
        license: metadata.license().map(|s| s.to_string()),
        compiler: CompilerSettings::from_metadata(&metadata),
        abi: artifact.abi,
        bytecode: artifact.bytecode.object,
        deployed_bytecode: artifact.deployed_bytecode.object,
        deployed_link_references: artifact.deployed_bytecode.link_references,
        storage_layout: artifact.storage_layout,
    })
}

/// Read the JSON envelope of an artifact without interpreting it.
pub fn load_artifact(path: &Path) -> Result<BuildArtifact> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ArtifactError::Malformed {
        file: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Decode the embedded metadata of an artifact, failing if it is absent.
pub fn load_metadata(path: &Path, artifact: &BuildArtifact) -> Result<CompilerMetadata> {
    match artifact.embedded_metadata() {
        Some(Ok(metadata)) => Ok(metadata),
        Some(Err(e)) => Err(ArtifactError::Malformed {
            file: path.display().to_string(),
            message: format!("embedded metadata: {e}"),
        }),
        None => Err(ArtifactError::MissingMetadata(path.display().to_string())),
    }
}

/// Source path of the compilation target, as discovery needs it.
pub fn read_source_path(path: &Path) -> Result<String> {
    let artifact = load_artifact(path)?;
    target_source_path(path, &artifact)
}

/// Source path of the compilation target of an already loaded artifact.
pub fn target_source_path(path: &Path, artifact: &BuildArtifact) -> Result<String> {
    let metadata = load_metadata(path, artifact)?;
    let (source, _) = metadata.compilation_target()?;
    Ok(source.to_string())
}

/// Contract name of an artifact: its file name without extension.
pub fn contract_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{artifact_json, write_json};
    use serde_json::json;

    #[test]
    fn parses_canonical_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Counter.json");
        write_json(&path, &artifact_json("src/Counter.sol", "Counter", "0x6080604052"));

        let record = parse_artifact(&path).unwrap();
        assert_eq!(record.name, "Counter");
        assert_eq!(record.chain, Chain::Evm);
        assert_eq!(record.source_path, "src/Counter.sol");
        assert_eq!(record.license.as_deref(), Some("MIT"));
        assert_eq!(record.bytecode, "0x6080604052");
        assert_eq!(record.compiler.version, "0.8.20+commit.a1b79de6");
        assert_eq!(record.compiler.short_version().as_deref(), Some("0.8.20"));
        assert!(record.compiler.optimizer_enabled);
        assert_eq!(record.compiler.optimizer_runs, 200);
    }

    #[test]
    fn interface_bytecode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for (i, object) in ["", "0x"].iter().enumerate() {
            let path = dir.path().join(format!("IThing{i}.json"));
            write_json(&path, &artifact_json("src/IThing.sol", "IThing", object));
            let err = parse_artifact(&path).unwrap_err();
            assert!(matches!(err, ArtifactError::NoBytecode(_)), "{err}");
        }
    }

    #[test]
    fn broken_metadata_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Legacy.json");
        write_json(
            &path,
            &json!({
                "abi": [],
                "bytecode": {"object": "0x6080"},
                "deployedBytecode": {"object": "0x6080"},
                "rawMetadata": "{not json"
            }),
        );

        let record = parse_artifact(&path).unwrap();
        assert_eq!(record.source_path, "");
        assert_eq!(record.license, None);
        assert_eq!(record.compiler, CompilerSettings::default());
        assert!(read_source_path(&path).is_err());
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let err = parse_artifact(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed { .. }));
    }

    #[test]
    fn missing_metadata_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bare.json");
        write_json(&path, &json!({"bytecode": {"object": "0x6080"}}));
        let err = read_source_path(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::MissingMetadata(_)));
    }
}
