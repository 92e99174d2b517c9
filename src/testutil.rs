//! Fixture helpers: scratch Foundry project trees for tests.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

pub const SOLC_LONG_VERSION: &str = "0.8.20+commit.a1b79de6";

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Compiler metadata for a single-source contract.
pub fn metadata_json(source_path: &str, name: &str) -> Value {
    json!({
        "compiler": {"version": SOLC_LONG_VERSION},
        "language": "Solidity",
        "settings": {
            "compilationTarget": {source_path: name},
            "evmVersion": "paris",
            "libraries": {},
            "metadata": {"bytecodeHash": "ipfs"},
            "optimizer": {"enabled": true, "runs": 200},
            "remappings": []
        },
        "sources": {
            source_path: {
                "keccak256": "0x00",
                "license": "MIT",
                "urls": []
            }
        },
        "version": 1
    })
}

pub fn artifact_with_metadata(bytecode: &str, metadata: &Value) -> Value {
    json!({
        "abi": [],
        "bytecode": {"object": bytecode, "linkReferences": {}},
        "deployedBytecode": {"object": bytecode, "linkReferences": {}},
        "storageLayout": {"storage": [], "types": {}},
        "rawMetadata": metadata.to_string()
    })
}

pub fn artifact_json(source_path: &str, name: &str, bytecode: &str) -> Value {
    artifact_with_metadata(bytecode, &metadata_json(source_path, name))
}

/// A scratch project with `out/` and `out/build-info/` in place.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out/build-info")).unwrap();
        Self { dir }
    }

    /// An empty directory, as before the first build.
    pub fn unbuilt() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `out/<file name of source>/<name>.json` and return its path.
    pub fn artifact(&self, source_path: &str, name: &str, bytecode: &str) -> PathBuf {
        self.artifact_value(
            source_path,
            name,
            &artifact_json(source_path, name, bytecode),
        )
    }

    pub fn artifact_value(&self, source_path: &str, name: &str, value: &Value) -> PathBuf {
        let file_name = Path::new(source_path)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let path = self
            .root()
            .join("out")
            .join(file_name)
            .join(format!("{name}.json"));
        write_json(&path, value);
        path
    }

    pub fn build_info(&self, id: &str, long_version: &str, source_path: &str, name: &str) -> PathBuf {
        let path = self
            .root()
            .join("out/build-info")
            .join(format!("{id}.json"));
        write_json(
            &path,
            &json!({
                "id": id,
                "solcVersion": long_version.split('+').next().unwrap(),
                "solcLongVersion": long_version,
                "input": {
                    "language": "Solidity",
                    "sources": {source_path: {"content": format!("contract {name} {{}}")}},
                    "settings": {"optimizer": {"enabled": true, "runs": 200}},
                    "allowPaths": [self.root().display().to_string()],
                    "basePath": self.root().display().to_string(),
                    "includePaths": []
                },
                "output": {
                    "contracts": {source_path: {name: {"abi": []}}}
                }
            }),
        );
        path
    }

    pub fn source(&self, path: &str, content: &str) {
        let full = self.root().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
}
