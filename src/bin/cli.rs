use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use forge_artifacts::config::{Config, CONFIG_FILE_NAME};
use forge_artifacts::error::ArtifactError;
use forge_artifacts::output::{self, OutputFormat, Report};
use forge_artifacts::{DiscoverOptions, MatchKind};

#[derive(Parser)]
#[command(
    name = "forge-artifacts",
    about = "Discover Foundry artifacts, rebuild verification inputs, match deployed bytecode",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List publishable contracts in a built project
    Discover {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Only consider these contracts (replaces the configured allow-list)
        #[arg(long = "contract", value_name = "NAME")]
        contracts: Vec<String>,

        /// Additional contract name exclusion pattern
        #[arg(long = "exclude", value_name = "PATTERN")]
        excludes: Vec<String>,

        /// Include a contract from outside the source tree
        #[arg(long = "dependency", value_name = "NAME")]
        dependencies: Vec<String>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List dependency contracts, or check that requested ones exist
    Dependencies {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Dependency names to validate
        #[arg(long = "require", value_name = "NAME")]
        required: Vec<String>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// Show the canonical record of one artifact
    Inspect {
        /// Artifact file, e.g. out/Counter.sol/Counter.json
        artifact: PathBuf,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// Print the whole-project Standard JSON Input that built a contract
    VerifyInput {
        /// Contract name
        contract: String,

        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Source path of the contract, to tell apart same-named contracts
        #[arg(long)]
        source_path: Option<String>,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Write the Standard JSON to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print a minimal Standard JSON Input rebuilt from one artifact's metadata
    StandardJson {
        /// Artifact file
        artifact: PathBuf,

        /// Project root the metadata source paths are relative to
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Write the Standard JSON to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Compare deployed bytecode against an artifact
    Compare {
        /// Artifact file
        artifact: PathBuf,

        /// Deployed bytecode as 0x-prefixed hex, or @file containing it
        #[arg(long)]
        deployed: String,

        /// Library address, as NAME=ADDRESS or path:NAME=ADDRESS
        #[arg(long = "library", value_name = "NAME=ADDRESS")]
        libraries: Vec<String>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// Generate a starter .forge-artifacts.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Discover {
            path,
            config,
            contracts,
            excludes,
            dependencies,
            format,
            output,
        } => {
            let options = DiscoverOptions {
                config_path: config,
                contracts_override: Some(contracts).filter(|c| !c.is_empty()),
                extra_excludes: excludes,
                extra_dependencies: dependencies,
            };
            cmd_discover(&path, &options, &format, output)
        }
        Commands::Dependencies {
            path,
            config,
            required,
            format,
        } => cmd_dependencies(&path, config, &required, &format),
        Commands::Inspect { artifact, format } => cmd_inspect(&artifact, &format),
        Commands::VerifyInput {
            contract,
            root,
            source_path,
            config,
            output,
        } => cmd_verify_input(&root, &contract, source_path.as_deref(), config, output),
        Commands::StandardJson {
            artifact,
            root,
            output,
        } => cmd_standard_json(&root, &artifact, output),
        Commands::Compare {
            artifact,
            deployed,
            libraries,
            format,
        } => cmd_compare(&artifact, &deployed, &libraries, &format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn parse_format(format_str: &str) -> OutputFormat {
    OutputFormat::from_str_lenient(format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    })
}

fn emit(rendered: &[u8], output_path: Option<PathBuf>) -> Result<(), ArtifactError> {
    match output_path {
        Some(out) => std::fs::write(&out, rendered)?,
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn cmd_discover(
    path: &Path,
    options: &DiscoverOptions,
    format_str: &str,
    output_path: Option<PathBuf>,
) -> Result<i32, ArtifactError> {
    let format = parse_format(format_str);
    let report = forge_artifacts::discover_project(path, options)?;
    let rendered = output::render(Report::Discovery(&report.candidates), format)?;
    emit(rendered.as_bytes(), output_path)?;

    // Exit code: 0 = something to publish, 1 = nothing found
    Ok(if report.artifact_paths().is_empty() { 1 } else { 0 })
}

fn cmd_dependencies(
    path: &Path,
    config: Option<PathBuf>,
    required: &[String],
    format_str: &str,
) -> Result<i32, ArtifactError> {
    let format = parse_format(format_str);
    let config = forge_artifacts::load_config(path, config.as_deref())?;

    let deps = if required.is_empty() {
        forge_artifacts::dependency_candidates(path, &config.project)?
    } else {
        forge_artifacts::validate_dependencies(path, &config.project, required)?
    };
    let rendered = output::render(Report::Dependencies(&deps), format)?;
    emit(rendered.as_bytes(), None)?;
    Ok(0)
}

fn cmd_inspect(artifact: &Path, format_str: &str) -> Result<i32, ArtifactError> {
    let format = parse_format(format_str);
    let record = match forge_artifacts::parse_artifact(artifact) {
        Ok(record) => record,
        Err(ArtifactError::NoBytecode(name)) => {
            eprintln!("{name} is an interface or abstract contract, nothing to inspect.");
            return Ok(1);
        }
        Err(e) => return Err(e),
    };
    let rendered = output::render(Report::Contract(&record), format)?;
    emit(rendered.as_bytes(), None)?;
    Ok(0)
}

fn cmd_verify_input(
    root: &Path,
    contract: &str,
    source_path: Option<&str>,
    config: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<i32, ArtifactError> {
    let config = forge_artifacts::load_config(root, config.as_deref())?;
    let input = forge_artifacts::get_verification_input(root, &config.project, contract, source_path)?;
    eprintln!("compiler: {}", input.compiler_version);
    emit(&input.standard_json, output_path)?;
    Ok(0)
}

fn cmd_standard_json(
    root: &Path,
    artifact: &Path,
    output_path: Option<PathBuf>,
) -> Result<i32, ArtifactError> {
    let input = forge_artifacts::generate_standard_json(root, artifact)?;
    eprintln!("compiler: {}", input.compiler_version);
    emit(&input.standard_json, output_path)?;
    Ok(0)
}

fn cmd_compare(
    artifact: &Path,
    deployed: &str,
    library_args: &[String],
    format_str: &str,
) -> Result<i32, ArtifactError> {
    let format = parse_format(format_str);
    let record = forge_artifacts::parse_artifact(artifact)?;

    let deployed_hex = match deployed.strip_prefix('@') {
        Some(file) => std::fs::read_to_string(file)?,
        None => deployed.to_string(),
    };
    let deployed_hex = deployed_hex.trim();
    let deployed_code = hex::decode(deployed_hex.strip_prefix("0x").unwrap_or(deployed_hex))?;

    let mut libraries = BTreeMap::new();
    for arg in library_args {
        let (name, address) = arg.split_once('=').ok_or_else(|| {
            ArtifactError::Config(format!("library must be NAME=ADDRESS, got '{arg}'"))
        })?;
        libraries.insert(name.to_string(), address.to_string());
    }

    let result = if libraries.is_empty() {
        forge_artifacts::compare_bytecode(&deployed_code, record.deployed_bytecode.as_bytes(), None)?
    } else {
        forge_artifacts::compare_with_link_references(
            &deployed_code,
            record.deployed_bytecode.as_bytes(),
            &record.deployed_link_references,
            &libraries,
        )?
    };

    let rendered = output::render(Report::Match(&result), format)?;
    emit(rendered.as_bytes(), None)?;

    // Exit code: 0 = full or partial match, 1 = no match
    Ok(if result.kind == MatchKind::None { 1 } else { 0 })
}

fn cmd_init(force: bool) -> Result<i32, ArtifactError> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {CONFIG_FILE_NAME}");

    Ok(0)
}
