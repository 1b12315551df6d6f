//! `config get|set|list|path`: view and edit `~/.pkgtools/config.ini`.

use std::io::Write;
use std::path::Path;

use clap::Subcommand;
use pkgtools::config::{ConfigFile, ConfigKey};

use super::emit;
use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., paths.ports_dir)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., packages.backend)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the file at `path`.
///
/// `get` and `list` show effective values, environment overrides included;
/// `set` edits the file only.
pub fn run(command: &ConfigCommands, path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(key, path, out),
        ConfigCommands::Set { key, value } => run_set(key, value, path, out),
        ConfigCommands::List => run_list(path, out),
        ConfigCommands::Path => emit(out, path.display()),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'pkgtools config list' to see available keys.",
            key
        ))
    })
}

fn load_effective(path: &Path) -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load_from(path)?.with_env_overrides(|name| std::env::var(name).ok()))
}

fn run_get(key: &str, path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let value = key.get(&load_effective(path)?);

    if value.is_empty() {
        emit(out, "(not set)")
    } else {
        emit(out, value)
    }
}

fn run_set(key: &str, value: &str, path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let key = parse_key(key)?;

    let mut config = ConfigFile::load_from(path)?;
    key.set(&mut config, value)?;
    config.save_to(path)?;

    tracing::info!(key = %key, path = %path.display(), "Updated configuration");
    emit(out, format_args!("Set {} = {}", key.name(), key.get(&config)))
}

fn run_list(path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let config = load_effective(path)?;
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                emit(out, "")?;
            }
            emit(out, format_args!("[{}]", section))?;
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            emit(out, format_args!("{} = (not set)", key.key_name()))?;
        } else {
            emit(out, format_args!("{} = {}", key.key_name(), value))?;
        }
    }

    Ok(())
}
