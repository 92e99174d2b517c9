use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArtifactError>;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Output directory not found at {}. Run `forge build` first.", .0.display())]
    OutputDirMissing(PathBuf),

    #[error(
        "Build info directory not found at {}. Run `forge build --build-info` to emit build records.",
        .0.display()
    )]
    BuildInfoMissing(PathBuf),

    #[error("No build info found for {}", describe_target(.contract, .source_path.as_deref()))]
    BuildInfoNotFound {
        contract: String,
        source_path: Option<String>,
    },

    #[error("Contract {0} has no bytecode (interface or abstract contract)")]
    NoBytecode(String),

    #[error("Source file {} declared in metadata does not exist", .0.display())]
    MissingSource(PathBuf),

    #[error("Malformed artifact {file}: {message}")]
    Malformed { file: String, message: String },

    #[error("Artifact {0} has no embedded metadata")]
    MissingMetadata(String),

    #[error("Metadata of {0} declares no sources")]
    EmptySources(String),

    #[error("Invalid compilation target: {0}")]
    CompilationTarget(String),

    #[error("Invalid library address for {library}: {address}")]
    InvalidLibraryAddress { library: String, address: String },

    #[error("No address supplied for linked library {0}")]
    UnresolvedLibrary(String),

    #[error("Bytecode has unlinked library placeholders, supply library addresses")]
    UnlinkedLibraries,

    #[error("{}", DependencyReport(.0))]
    UnknownDependencies(Vec<MissingDependency>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A requested dependency with no matching artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub name: String,
    pub suggestions: Vec<String>,
}

/// Coarse classification of an error, for callers that present errors
/// differently depending on what the user has to do about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A build step has not been run.
    ConfigurationMissing,
    NotFound,
    Malformed,
    ValidationFailure,
    Config,
    Io,
}

impl ArtifactError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutputDirMissing(_) | Self::BuildInfoMissing(_) => ErrorKind::ConfigurationMissing,
            Self::BuildInfoNotFound { .. } | Self::NoBytecode(_) | Self::MissingSource(_) => {
                ErrorKind::NotFound
            }
            Self::Malformed { .. }
            | Self::MissingMetadata(_)
            | Self::EmptySources(_)
            | Self::CompilationTarget(_)
            | Self::InvalidLibraryAddress { .. }
            | Self::UnresolvedLibrary(_)
            | Self::UnlinkedLibraries
            | Self::Json(_)
            | Self::InvalidHex(_) => ErrorKind::Malformed,
            Self::UnknownDependencies(_) => ErrorKind::ValidationFailure,
            Self::Config(_) | Self::Toml(_) => ErrorKind::Config,
            Self::Io(_) | Self::Walk(_) => ErrorKind::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        2
    }
}

fn describe_target(contract: &str, source_path: Option<&str>) -> String {
    match source_path {
        Some(source) => format!("{source}:{contract}"),
        None => contract.to_string(),
    }
}

struct DependencyReport<'a>(&'a [MissingDependency]);

impl fmt::Display for DependencyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown dependencies:")?;
        for missing in self.0 {
            write!(f, "\n  {}", missing.name)?;
            if !missing.suggestions.is_empty() {
                write!(f, " (did you mean: {}?)", missing.suggestions.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dirs_are_configuration_errors() {
        let err = ArtifactError::BuildInfoMissing(PathBuf::from("out/build-info"));
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert!(err.to_string().contains("--build-info"));

        let err = ArtifactError::OutputDirMissing(PathBuf::from("out"));
        assert!(err.to_string().contains("forge build"));
        assert!(!err.to_string().contains("--build-info"));
    }

    #[test]
    fn unknown_dependencies_lists_suggestions() {
        let err = ArtifactError::UnknownDependencies(vec![
            MissingDependency {
                name: "ERC20s".into(),
                suggestions: vec!["ERC20".into()],
            },
            MissingDependency {
                name: "Nothing".into(),
                suggestions: vec![],
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("ERC20s (did you mean: ERC20?)"));
        assert!(text.contains("\n  Nothing"));
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn build_info_not_found_names_target() {
        let err = ArtifactError::BuildInfoNotFound {
            contract: "MetaCoin".into(),
            source_path: Some("src/MetaCoin.sol".into()),
        };
        assert_eq!(
            err.to_string(),
            "No build info found for src/MetaCoin.sol:MetaCoin"
        );
    }
}
