//! pkgtools - package identifiers, ports INDEX records and package queries
//!
//! The building blocks of a ports/packages upgrade tool:
//!
//! - [`package`]: `<name>-<version>` identifiers and package info commands
//! - [`version`]: FreeBSD package version ordering
//! - [`port`]: ports `INDEX` lines and whole index files
//! - [`query`]: wildcard, regex and install-date package queries
//! - [`shell`]: shell-style word splitting and quoting
//! - [`search`]: binary search over sorted slices
//! - [`config`]: user configuration and environment overrides
//! - [`workdir`]: scratch directories

pub mod config;
pub mod error;
pub mod package;
pub mod port;
pub mod query;
pub mod search;
pub mod shell;
pub mod version;
pub mod workdir;

pub use error::{PkgError, PkgResult};
