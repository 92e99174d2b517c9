use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metadata::CompilerMetadata;

/// Library placeholder positions: source path → library name → offsets.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// One per-contract artifact as written by `forge build`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifact {
    #[serde(default)]
    pub abi: serde_json::Value,
    #[serde(default)]
    pub bytecode: BytecodeObject,
    #[serde(default)]
    pub deployed_bytecode: BytecodeObject,
    #[serde(default)]
    pub storage_layout: serde_json::Value,
    /// Compiler metadata as the exact string the compiler emitted.
    #[serde(default)]
    pub raw_metadata: Option<String>,
    /// Decoded copy of the metadata, present in newer artifact formats.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytecodeObject {
    /// Hex string, `0x`-prefixed. May contain linker placeholders.
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub link_references: LinkReferences,
}

/// Byte range of one linker placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOffset {
    pub start: usize,
    pub length: usize,
}

impl BytecodeObject {
    /// Empty or bare `0x` means there is no code to deploy.
    pub fn is_empty(&self) -> bool {
        let object = self.object.trim();
        object.is_empty() || object == "0x"
    }
}

impl BuildArtifact {
    /// Interfaces and abstract contracts compile to no bytecode.
    pub fn is_interface(&self) -> bool {
        self.bytecode.is_empty()
    }

    /// Decode the embedded metadata, preferring the raw string.
    ///
    /// Returns `None` when the artifact carries no metadata at all.
    pub fn embedded_metadata(&self) -> Option<Result<CompilerMetadata, serde_json::Error>> {
        match (&self.raw_metadata, &self.metadata) {
            (Some(raw), _) if !raw.trim().is_empty() => Some(serde_json::from_str(raw)),
            (_, Some(value)) if !value.is_null() => {
                Some(CompilerMetadata::deserialize(value))
            }
            _ => None,
        }
    }
}
