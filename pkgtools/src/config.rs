//! User configuration (`~/.pkgtools/config.ini`).
//!
//! ```ini
//! [paths]
//! ports_dir = /usr/ports
//! pkg_dbdir = /var/db/pkg
//! tmp_dir = /var/tmp
//!
//! [packages]
//! backend = pkgng
//! ```
//!
//! Every setting has a default, so a missing file is not an error. The
//! usual environment variables (`PORTSDIR`, `PKG_DBDIR`, `PKG_TMPDIR`,
//! `TMPDIR`) override the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::package::PackageBackend;

/// Default root of the ports tree.
pub const DEFAULT_PORTS_DIR: &str = "/usr/ports";

/// Default location of the legacy package database.
pub const DEFAULT_PKG_DBDIR: &str = "/var/db/pkg";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A setting has a value of the wrong shape.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// No such setting.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsSettings {
    /// Root of the ports tree.
    pub ports_dir: PathBuf,
    /// Legacy package database directory.
    pub pkg_dbdir: PathBuf,
    /// Parent directory for temporary workspaces.
    pub tmp_dir: Option<PathBuf>,
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self {
            ports_dir: PathBuf::from(DEFAULT_PORTS_DIR),
            pkg_dbdir: PathBuf::from(DEFAULT_PKG_DBDIR),
            tmp_dir: None,
        }
    }
}

/// `[packages]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagesSettings {
    /// Which package tools are installed.
    pub backend: PackageBackend,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub paths: PathsSettings,
    pub packages: PackagesSettings,
}

/// Path of the configuration file, `~/.pkgtools/config.ini`.
pub fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pkgtools")
        .join("config.ini")
}

impl ConfigFile {
    /// Load from [`config_file_path`], then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::load_from(&config_file_path())?.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Load from `path`; defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Apply `PORTSDIR`, `PKG_DBDIR`, `PKG_TMPDIR` and `TMPDIR`.
    ///
    /// `lookup` returns the value of an environment variable; empty values
    /// are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(dir) = var("PORTSDIR") {
            self.paths.ports_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("PKG_DBDIR") {
            self.paths.pkg_dbdir = PathBuf::from(dir);
        }
        if let Some(dir) = var("PKG_TMPDIR").or_else(|| var("TMPDIR")) {
            self.paths.tmp_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Write to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        ini.write_to_file(path).map_err(io_error)
    }
}

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    PortsDir,
    PkgDbDir,
    TmpDir,
    Backend,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::PortsDir,
            ConfigKey::PkgDbDir,
            ConfigKey::TmpDir,
            ConfigKey::Backend,
        ]
    }

    /// INI section holding the key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::PortsDir | ConfigKey::PkgDbDir | ConfigKey::TmpDir => "paths",
            ConfigKey::Backend => "packages",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::PortsDir => "ports_dir",
            ConfigKey::PkgDbDir => "pkg_dbdir",
            ConfigKey::TmpDir => "tmp_dir",
            ConfigKey::Backend => "backend",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::PortsDir => config.paths.ports_dir.display().to_string(),
            ConfigKey::PkgDbDir => config.paths.pkg_dbdir.display().to_string(),
            ConfigKey::TmpDir => config
                .paths
                .tmp_dir
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            ConfigKey::Backend => config.packages.backend.to_string(),
        }
    }

    /// Parse and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = || ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
        };

        match self {
            ConfigKey::PortsDir | ConfigKey::PkgDbDir if value.is_empty() => return Err(invalid()),
            ConfigKey::PortsDir => config.paths.ports_dir = PathBuf::from(value),
            ConfigKey::PkgDbDir => config.paths.pkg_dbdir = PathBuf::from(value),
            ConfigKey::TmpDir => {
                config.paths.tmp_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ConfigKey::Backend => {
                config.packages.backend = value.parse().map_err(|_| invalid())?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
