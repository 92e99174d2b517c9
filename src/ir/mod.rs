//! Data model shared by every stage.
//!
//! The parser turns a `BuildArtifact` into a `ContractRecord`. Discovery,
//! verification input reconstruction and bytecode comparison all consume
//! these types rather than raw JSON.

pub mod artifact;
pub mod build_info;
pub mod metadata;
pub mod standard_json;

use serde::{Deserialize, Serialize};

pub use artifact::{BuildArtifact, BytecodeObject, LinkOffset, LinkReferences};
pub use build_info::BuildRecord;
pub use metadata::CompilerMetadata;
pub use standard_json::StandardJsonInput;

/// Canonical record of one publishable contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Contract name, taken from the artifact file name.
    pub name: String,
    pub chain: Chain,
    /// Source path from the compilation target, empty if unknown.
    pub source_path: String,
    /// SPDX identifier declared in the sources.
    pub license: Option<String>,
    pub abi: serde_json::Value,
    pub bytecode: String,
    pub deployed_bytecode: String,
    pub deployed_link_references: LinkReferences,
    pub storage_layout: serde_json::Value,
    pub compiler: CompilerSettings,
}

/// Which virtual machine the bytecode targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Evm,
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evm => write!(f, "evm"),
        }
    }
}

/// Compiler settings needed to rebuild the bytecode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Long compiler version, e.g. `0.8.20+commit.a1b79de6`.
    pub version: String,
    pub evm_version: Option<String>,
    pub via_ir: bool,
    pub optimizer_enabled: bool,
    pub optimizer_runs: u64,
}

impl CompilerSettings {
    pub fn from_metadata(metadata: &CompilerMetadata) -> Self {
        Self {
            version: metadata.compiler.version.clone(),
            evm_version: metadata.settings.evm_version.clone(),
            via_ir: metadata.settings.via_ir.unwrap_or(false),
            optimizer_enabled: metadata.settings.optimizer.enabled,
            optimizer_runs: metadata.settings.optimizer.runs,
        }
    }

    /// `major.minor.patch` of the compiler, if the version parses.
    pub fn short_version(&self) -> Option<String> {
        metadata::short_version(&self.version)
    }
}
