use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metadata::{MetadataEncoding, OptimizerSettings};

/// The subset of the compiler's Standard JSON Input that reconstruction emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardJsonInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceContent>,
    pub settings: InputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSettings {
    pub optimizer: OptimizerSettings,
    /// Left out when unset so the compiler picks its own default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
    #[serde(default, rename = "viaIR", skip_serializing_if = "Option::is_none")]
    pub via_ir: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub libraries: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remappings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataEncoding>,
    pub output_selection: OutputSelection,
}

/// file pattern → contract pattern → requested outputs.
pub type OutputSelection = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Outputs requested for every file and contract.
pub const SELECTED_OUTPUTS: &[&str] = &["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"];

/// `{"*": {"*": [abi, evm.bytecode, evm.deployedBytecode, metadata]}}`.
pub fn default_output_selection() -> OutputSelection {
    let outputs = SELECTED_OUTPUTS.iter().map(|s| s.to_string()).collect();
    BTreeMap::from([("*".to_string(), BTreeMap::from([("*".to_string(), outputs)]))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_fields_are_omitted() {
        let input = StandardJsonInput {
            language: "Solidity".into(),
            sources: BTreeMap::new(),
            settings: InputSettings {
                optimizer: OptimizerSettings::default(),
                evm_version: None,
                via_ir: None,
                libraries: BTreeMap::new(),
                remappings: vec![],
                metadata: None,
                output_selection: default_output_selection(),
            },
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value["settings"],
            json!({
                "optimizer": {"enabled": false, "runs": 0},
                "outputSelection": {
                    "*": {"*": ["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"]}
                }
            })
        );
    }
}
