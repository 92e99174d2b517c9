//! Compiler metadata embedded in every artifact.
//!
//! This is the JSON document whose content hash the compiler appends to the
//! bytecode, so it records exactly which sources and settings produced it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerMetadata {
    #[serde(default)]
    pub compiler: CompilerInfo,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub settings: MetadataSettings,
    #[serde(default)]
    pub sources: BTreeMap<String, MetadataSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    /// Long version, e.g. `0.8.20+commit.a1b79de6`.
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSettings {
    #[serde(default)]
    pub compilation_target: BTreeMap<String, String>,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
    #[serde(default)]
    pub evm_version: Option<String>,
    #[serde(default, rename = "viaIR")]
    pub via_ir: Option<bool>,
    /// Either flat `path:Name → address` or nested `path → Name → address`.
    #[serde(default)]
    pub libraries: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub remappings: Vec<String>,
    #[serde(default)]
    pub metadata: Option<MetadataEncoding>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub runs: u64,
}

/// How the compiler encodes the metadata trailer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEncoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_literal_content: Option<bool>,
    #[serde(default, rename = "appendCBOR", skip_serializing_if = "Option::is_none")]
    pub append_cbor: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSource {
    #[serde(default)]
    pub keccak256: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl CompilerMetadata {
    /// The single (source path, contract name) this metadata was emitted for.
    pub fn compilation_target(&self) -> Result<(&str, &str)> {
        let target = &self.settings.compilation_target;
        let mut entries = target.iter();
        match (entries.next(), entries.next()) {
            (Some((path, name)), None) => Ok((path.as_str(), name.as_str())),
            (None, _) => Err(ArtifactError::CompilationTarget(
                "metadata declares no compilation target".into(),
            )),
            (Some(_), Some(_)) => Err(ArtifactError::CompilationTarget(format!(
                "expected exactly one compilation target, found {}",
                target.len()
            ))),
        }
    }

    /// First non-empty license among the declared sources, in path order.
    pub fn license(&self) -> Option<&str> {
        self.sources
            .values()
            .find_map(|source| non_empty(source.license.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `0.8.20+commit.a1b79de6` → `0.8.20`. `None` if not a semver version.
pub fn short_version(long_version: &str) -> Option<String> {
    let trimmed = long_version.trim().trim_start_matches('v');
    let version = semver::Version::parse(trimmed).ok()?;
    Some(format!(
        "{}.{}.{}",
        version.major, version.minor, version.patch
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> CompilerMetadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn single_compilation_target() {
        let meta = metadata(json!({
            "settings": {"compilationTarget": {"src/Counter.sol": "Counter"}}
        }));
        assert_eq!(
            meta.compilation_target().unwrap(),
            ("src/Counter.sol", "Counter")
        );
    }

    #[test]
    fn zero_or_many_targets_are_errors() {
        let empty = CompilerMetadata::default();
        assert!(empty.compilation_target().is_err());

        let many = metadata(json!({
            "settings": {"compilationTarget": {"src/A.sol": "A", "src/B.sol": "B"}}
        }));
        let err = many.compilation_target().unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn license_is_first_in_path_order() {
        let meta = metadata(json!({
            "settings": {"compilationTarget": {"src/T.sol": "T"}},
            "sources": {
                "src/T.sol": {"license": "MIT"},
                "lib/A.sol": {"license": "GPL-3.0"}
            }
        }));
        assert_eq!(meta.license(), Some("GPL-3.0"));
    }

    #[test]
    fn license_skips_empty_entries() {
        let meta = metadata(json!({
            "sources": {
                "a.sol": {"license": ""},
                "b.sol": {},
                "c.sol": {"license": "Apache-2.0"}
            }
        }));
        assert_eq!(meta.license(), Some("Apache-2.0"));
    }

    #[test]
    fn solc_settings_decode() {
        let meta = metadata(json!({
            "compiler": {"version": "0.8.24+commit.e11b9ed9"},
            "language": "Solidity",
            "settings": {
                "evmVersion": "cancun",
                "viaIR": true,
                "optimizer": {"enabled": true, "runs": 10000, "details": {"yul": true}},
                "metadata": {"bytecodeHash": "none", "appendCBOR": false},
                "remappings": ["forge-std/=lib/forge-std/src/"]
            }
        }));
        assert_eq!(meta.settings.evm_version.as_deref(), Some("cancun"));
        assert_eq!(meta.settings.via_ir, Some(true));
        assert_eq!(
            meta.settings.optimizer,
            OptimizerSettings { enabled: true, runs: 10000 }
        );
        let encoding = meta.settings.metadata.unwrap();
        assert_eq!(encoding.bytecode_hash.as_deref(), Some("none"));
        assert_eq!(encoding.append_cbor, Some(false));
        assert_eq!(encoding.use_literal_content, None);
    }

    #[test]
    fn short_version_strips_build() {
        assert_eq!(
            short_version("0.8.20+commit.a1b79de6").as_deref(),
            Some("0.8.20")
        );
        assert_eq!(short_version("v0.7.6").as_deref(), Some("0.7.6"));
        assert_eq!(short_version("nightly"), None);
    }
}
