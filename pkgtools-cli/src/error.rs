//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use pkgtools::config::ConfigError;
use pkgtools::workdir::WorkdirError;
use pkgtools::PkgError;

/// Errors reported by `pkgtools` subcommands.
#[derive(Debug)]
pub enum CliError {
    /// Parsing or comparison failure from the library.
    Pkg(PkgError),
    /// Bad configuration key or value, or unreadable config file.
    Config(String),
    /// Reading or writing a file.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Temporary workspace could not be created.
    Workdir(WorkdirError),
    /// Invalid combination of arguments.
    Usage(String),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Pkg(e) => write!(f, "{}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Workdir(e) => write!(f, "{}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pkg(e) => Some(e),
            CliError::Io { source, .. } => Some(source),
            CliError::Workdir(e) => Some(e),
            CliError::Config(_) | CliError::Usage(_) => None,
        }
    }
}

impl From<PkgError> for CliError {
    fn from(e: PkgError) -> Self {
        CliError::Pkg(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<WorkdirError> for CliError {
    fn from(e: WorkdirError) -> Self {
        CliError::Workdir(e)
    }
}
