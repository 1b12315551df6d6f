//! `info-cmd`: print the shell command that reports package information.

use std::io::Write;

use clap::Args;
use pkgtools::config::ConfigFile;
use pkgtools::package::{info_command, InfoField, PackageBackend};

use super::emit;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Installed package name, or path to a package file
    pub package: String,

    /// Information field (origin, prefix, comment, files, ...)
    pub field: String,

    /// Package tool set (pkgng or legacy); defaults to packages.backend
    #[arg(long)]
    pub backend: Option<String>,
}

/// Print the command line, or list the fields when `field` is `list`.
pub fn run(args: &InfoArgs, config: &ConfigFile, out: &mut dyn Write) -> Result<(), CliError> {
    let backend: PackageBackend = match &args.backend {
        Some(name) => name.parse()?,
        None => config.packages.backend,
    };

    if args.field == "list" {
        for field in InfoField::ALL {
            let supported = match backend {
                PackageBackend::Pkgng => field.query_format().is_some(),
                PackageBackend::Legacy => field.legacy_flag().is_some(),
            };
            if supported {
                emit(out, field)?;
            }
        }
        return Ok(());
    }

    let field: InfoField = args.field.parse()?;
    tracing::debug!(backend = %backend, field = %field, "Building info command");
    emit(out, info_command(backend, &args.package, field)?)
}
