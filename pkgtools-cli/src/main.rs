//! pkgtools CLI - Command-line interface
//!
//! Query installed packages and ports INDEX files, compare package
//! versions, and split or quote shell command lines.

mod commands;
mod error;
mod pkgdb;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pkgtools::config::{config_file_path, ConfigFile};
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::config::ConfigCommands;
use commands::info::InfoArgs;
use commands::ports::PortsArgs;
use commands::query::MatchArgs;
use commands::shell::{JoinArgs, SplitArgs};
use error::CliError;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PKGTOOLS_LOG";

#[derive(Debug, Parser)]
#[command(name = "pkgtools", version, about = "FreeBSD package and ports INDEX tooling")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.pkgtools/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List installed packages matching any of the patterns
    Match(MatchArgs),

    /// Select ports from an INDEX file
    Ports(PortsArgs),

    /// Split a command line into words
    Split(SplitArgs),

    /// Quote words into a command line
    Join(JoinArgs),

    /// Compare two package identifiers or versions
    Compare(CompareArgs),

    /// Print the command that queries package information
    InfoCmd(InfoArgs),

    /// View or edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Result<ConfigFile, CliError> {
    let config = ConfigFile::load_from(path)?.with_env_overrides(|name| std::env::var(name).ok());
    tracing::debug!(
        config = %path.display(),
        ports_dir = %config.paths.ports_dir.display(),
        pkg_dbdir = %config.paths.pkg_dbdir.display(),
        "Loaded configuration"
    );
    Ok(config)
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);

    match &cli.command {
        Commands::Match(args) => commands::query::run(args, &load_config(&config_path)?, out),
        Commands::Ports(args) => commands::ports::run(args, &load_config(&config_path)?, out),
        Commands::Split(args) => commands::shell::run_split(args, out),
        Commands::Join(args) => commands::shell::run_join(args, out),
        Commands::Compare(args) => commands::compare::run(args, out),
        Commands::InfoCmd(args) => commands::info::run(args, &load_config(&config_path)?, out),
        Commands::Config(command) => commands::config::run(command, &config_path, out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run(cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = out.flush();
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
