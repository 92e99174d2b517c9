use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::Deserialize;

/// Top-level keys the compiler accepts in a Standard JSON Input.
pub const STANDARD_JSON_KEYS: &[&str] = &["language", "sources", "settings"];

/// One compiler invocation as saved under `out/build-info/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub solc_version: String,
    #[serde(default)]
    pub solc_long_version: String,
    /// Standard JSON Input, plus whatever keys the build tool added.
    #[serde(default)]
    pub input: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub output: BuildOutput,
}

/// Only the manifest part of the compiler output is kept. Per-contract
/// output is skipped while decoding, it can run to hundreds of megabytes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildOutput {
    /// source path → contract name.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, IgnoredAny>>,
}

impl BuildRecord {
    /// Has a version and an input the compiler could be fed again.
    pub fn is_structurally_valid(&self) -> bool {
        !self.solc_long_version.trim().is_empty()
            && self.input.get("sources").is_some_and(|v| v.is_object())
            && self.input.get("settings").is_some_and(|v| v.is_object())
    }

    /// Whether this invocation produced `contract` from `source_path`.
    pub fn produced(&self, source_path: &str, contract: &str) -> bool {
        self.output
            .contracts
            .get(source_path)
            .is_some_and(|contracts| contracts.contains_key(contract))
    }

    /// Source paths under which this invocation produced `contract`.
    pub fn sources_defining<'a>(&'a self, contract: &'a str) -> impl Iterator<Item = &'a str> {
        self.output
            .contracts
            .iter()
            .filter(move |(_, contracts)| contracts.contains_key(contract))
            .map(|(source, _)| source.as_str())
    }

    /// The input with build-tool-injected keys removed.
    pub fn standard_json_input(&self) -> serde_json::Map<String, serde_json::Value> {
        strip_injected_keys(&self.input)
    }
}

/// Keep only the keys the compiler's Standard JSON schema allows.
pub fn strip_injected_keys(
    input: &serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    input
        .iter()
        .filter(|(key, _)| STANDARD_JSON_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
