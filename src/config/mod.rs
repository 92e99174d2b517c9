use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::discovery::policy::DiscoveryPolicy;
use crate::error::Result;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = ".forge-artifacts.toml";

/// Top-level configuration from `.forge-artifacts.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectLayout,
    #[serde(default)]
    pub discovery: DiscoveryPolicy,
}

/// Where the build toolchain puts things, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayout {
    /// Compiler output directory.
    #[serde(default = "default_out")]
    pub out: PathBuf,
    /// Build record directory, relative to `out`.
    #[serde(default = "default_build_info")]
    pub build_info: PathBuf,
    /// Primary source tree. Contracts outside it are dependencies.
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Suffixes of the one-directory-per-source-file convention.
    #[serde(default = "default_source_suffixes")]
    pub source_suffixes: Vec<String>,
}

fn default_out() -> PathBuf {
    PathBuf::from("out")
}

fn default_build_info() -> PathBuf {
    PathBuf::from("build-info")
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_source_suffixes() -> Vec<String> {
    vec![".sol".into()]
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            out: default_out(),
            build_info: default_build_info(),
            src: default_src(),
            source_suffixes: default_source_suffixes(),
        }
    }
}

impl ProjectLayout {
    pub fn out_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.out)
    }

    pub fn build_info_dir(&self, root: &Path) -> PathBuf {
        self.out_dir(root).join(&self.build_info)
    }

    /// Whether a directory name follows the per-source-file convention.
    pub fn is_source_dir_name(&self, name: &str) -> bool {
        self.source_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Whether a metadata source path lies in the primary source tree.
    pub fn is_primary_source(&self, source_path: &str) -> bool {
        Path::new(source_path).starts_with(&self.src)
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `.forge-artifacts.toml` from a project root, or defaults.
    pub fn load_from_root(root: &Path) -> Result<Self> {
        Self::load(&root.join(CONFIG_FILE_NAME))
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# forge-artifacts configuration

[project]
# Compiler output directory and build record directory inside it.
out = "out"
build_info = "build-info"
# Primary source tree; contracts elsewhere are treated as dependencies.
src = "src"

[discovery]
# Only consider these contract names (omit to consider all).
# contracts = ["Counter"]

# Exclude contracts whose name matches by suffix, prefix or glob.
exclude = ["Test", "Script", "Mock*"]

# Exclude contracts whose source path contains or glob-matches these.
exclude_paths = ["test/", "script/"]

# Contracts outside `src` to publish as dependencies (case-insensitive).
# dependencies = ["ERC20"]
"#
    }
}
