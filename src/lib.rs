//! forge-artifacts: Foundry build artifact discovery and verification inputs.
//!
//! Reads a `forge build` output tree and answers three questions: which
//! contracts are publishable, what exact compiler input reproduces a
//! contract's bytecode, and whether deployed code matches a stored artifact.
//! Everything here is a read-only transformation over files on disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use forge_artifacts::{discover_project, DiscoverOptions};
//!
//! let report = discover_project(Path::new("./my-foundry-project"), &DiscoverOptions::default()).unwrap();
//! for path in report.artifact_paths() {
//!     let record = forge_artifacts::parse_artifact(&path).unwrap();
//!     println!("{} ({})", record.name, record.source_path);
//! }
//! ```

pub mod bytecode;
pub mod config;
pub mod discovery;
pub mod error;
pub mod ir;
pub mod output;
pub mod parser;
pub mod verify;

#[cfg(test)]
pub(crate) mod testutil;

use std::path::{Path, PathBuf};

use config::Config;
use discovery::Candidate;
use error::Result;

pub use bytecode::{compare_bytecode, compare_with_link_references, strip_metadata, MatchKind, MatchResult};
pub use discovery::{dependency_candidates, discover, validate_dependencies, DiscoveryPolicy};
pub use parser::parse_artifact;
pub use verify::{generate_standard_json, get_verification_input, VerificationInput};

/// Options for a discovery invocation.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Path to config file (defaults to `.forge-artifacts.toml` in the project root).
    pub config_path: Option<PathBuf>,
    /// Replaces the configured contract allow-list.
    pub contracts_override: Option<Vec<String>>,
    /// Added to the configured name exclusions.
    pub extra_excludes: Vec<String>,
    /// Added to the configured dependency allow-list.
    pub extra_dependencies: Vec<String>,
}

/// Result of discovering a project.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub root: PathBuf,
    pub candidates: Vec<Candidate>,
}

impl DiscoveryReport {
    /// Paths of the included artifacts, in discovery order.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .filter(|c| c.is_included())
            .map(|c| c.path.clone())
            .collect()
    }
}

/// Load the project config, honoring an explicit config path.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(path),
        None => Config::load_from_root(root),
    }
}

/// Discover publishable artifacts: load config, apply overrides, walk `out/`.
pub fn discover_project(root: &Path, options: &DiscoverOptions) -> Result<DiscoveryReport> {
    let mut config = load_config(root, options.config_path.as_deref())?;

    if let Some(contracts) = &options.contracts_override {
        config.discovery.contracts = Some(contracts.clone());
    }
    config
        .discovery
        .exclude
        .extend(options.extra_excludes.iter().cloned());
    config
        .discovery
        .dependencies
        .extend(options.extra_dependencies.iter().cloned());

    let candidates = discovery::discover_candidates(root, &config.project, &config.discovery)?;
    Ok(DiscoveryReport {
        root: root.to_path_buf(),
        candidates,
    })
}
