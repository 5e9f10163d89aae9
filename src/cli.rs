//! Command-line interface for exhaustruct.

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, DEFAULT_CONFIG_NAMES};
use crate::report::{self, Format};
use crate::runner::{collect_dumps, Runner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default configuration written by `init`.
const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Find Go struct literals that leave required fields unset.
///
/// Reads program dumps produced by the Go front end and reports every
/// struct literal missing required fields.
#[derive(Parser)]
#[command(name = "exhaustruct")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check program dumps for incomplete struct literals
    Check(CheckArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Program dump, or a directory searched for *.json dumps
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only check types matching this pattern (repeatable)
    #[arg(short, long)]
    pub include: Vec<String>,

    /// Skip types matching this pattern (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Allow empty literals of every type
    #[arg(long)]
    pub allow_empty: bool,

    /// Allow empty literals of types matching this pattern (repeatable)
    #[arg(long)]
    pub allow_empty_include: Vec<String>,

    /// Allow empty literals in return statements
    #[arg(long)]
    pub allow_empty_returns: bool,

    /// Allow empty literals in `:=` and `var` declarations
    #[arg(long)]
    pub allow_empty_declarations: bool,

    /// Ignore //exhaustruct: comment directives
    #[arg(long)]
    pub no_directives: bool,

    /// Directory that relative source paths in the dumps are resolved against
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "exhaustruct.yaml")]
    pub output: PathBuf,
}

impl CheckArgs {
    /// Extend a file configuration with the command-line flags.
    pub fn apply(&self, mut config: Config) -> Config {
        config.include.extend(self.include.iter().cloned());
        config.exclude.extend(self.exclude.iter().cloned());
        config
            .allow_empty_include
            .extend(self.allow_empty_include.iter().cloned());
        config.allow_empty |= self.allow_empty;
        config.allow_empty_returns |= self.allow_empty_returns;
        config.allow_empty_declarations |= self.allow_empty_declarations;
        if self.no_directives {
            config.directives = false;
        }
        config
    }
}

/// Load the configuration named on the command line, or a discovered one.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::parse_file(path)
            .map_err(|e| anyhow::anyhow!("error parsing config {}: {}", path.display(), e));
    }

    match Config::discover(Path::new(".")) {
        Some(path) => {
            log::debug!("using config {}", path.display());
            Config::parse_file(&path)
                .map_err(|e| anyhow::anyhow!("error parsing config {}: {}", path.display(), e))
        }
        None => {
            log::debug!(
                "no config file found (looked for {}), using defaults",
                DEFAULT_CONFIG_NAMES.join(", ")
            );
            Ok(Config::default())
        }
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let format = match args.format.parse::<Format>() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => args.apply(c),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let settings = match config.prepare() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let dumps = collect_dumps(&abs_path)?;
    if dumps.is_empty() {
        log::warn!("no program dumps found under {}", abs_path.display());
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(settings).source_root(args.source_root.as_ref());
    let result = runner.run(&dumps)?;

    let path_str = args.path.to_string_lossy().to_string();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Json => report::write_json(&mut out, &path_str, &result)?,
        Format::Sarif => {
            let base = args.source_root.clone().unwrap_or_default();
            report::write_sarif(&mut out, &base, &result)?
        }
        Format::Pretty => report::write_pretty(&mut out, &path_str, &result)?,
    }

    if result.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: exhaustruct check <dump.json> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
