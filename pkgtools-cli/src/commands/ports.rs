//! `ports`: select records from a ports INDEX, optionally writing them out
//! re-rooted at another ports tree.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use pkgtools::config::ConfigFile;
use pkgtools::port::{PortIndex, PortRecord};
use pkgtools::query::QueryMatcher;
use pkgtools::workdir::{TempWorkspace, DEFAULT_TMP_DIR};

use super::emit;
use super::query::parse_patterns;
use crate::error::CliError;
use crate::pkgdb::FsPackageDatabase;

#[derive(Debug, Args)]
pub struct PortsArgs {
    /// Pattern matched against origins (`www/*`) and package names
    #[arg(default_value = "*")]
    pub pattern: String,

    /// Treat the pattern as a regular expression
    #[arg(short = 'x', long)]
    pub regex: bool,

    /// INDEX file to read; defaults to <ports_dir>/INDEX
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Root of the ports tree used in written records; defaults to paths.ports_dir
    #[arg(long, value_name = "DIR")]
    pub ports_dir: Option<String>,

    /// Write the selected records as an INDEX file instead of listing them
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// List `<origin> <pkgname>` for each selected port, or write them to
/// `--output`.
pub fn run(args: &PortsArgs, config: &ConfigFile, out: &mut dyn Write) -> Result<(), CliError> {
    let index_path = args
        .index
        .clone()
        .unwrap_or_else(|| config.paths.ports_dir.join("INDEX"));
    let text = std::fs::read_to_string(&index_path).map_err(|e| CliError::io(&index_path, e))?;
    let index = PortIndex::parse(&text)?;

    let pattern = parse_patterns(std::slice::from_ref(&args.pattern), args.regex)?
        .pop()
        .ok_or_else(|| CliError::Usage("missing pattern".to_string()))?;

    let db = FsPackageDatabase::new(&config.paths.pkg_dbdir);
    let matcher = QueryMatcher::new(&db);
    let selected = index.select(&pattern, &matcher);

    tracing::info!(
        index = %index_path.display(),
        total = index.len(),
        selected = selected.len(),
        "Selected ports"
    );

    match &args.output {
        Some(output) => {
            let ports_dir = args
                .ports_dir
                .clone()
                .unwrap_or_else(|| config.paths.ports_dir.display().to_string());
            let tmp_dir = config
                .paths
                .tmp_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TMP_DIR));
            write_index(&selected, &ports_dir, &tmp_dir, output)
        }
        None => {
            for record in selected {
                emit(out, format_args!("{} {}", record.origin(), record.pkgname()))?;
            }
            Ok(())
        }
    }
}

/// Write `records` to `output`, staging the file in a scratch workspace so
/// a partially written INDEX never replaces an existing one.
fn write_index(
    records: &[&PortRecord],
    ports_dir: &str,
    tmp_dir: &Path,
    output: &Path,
) -> Result<(), CliError> {
    let workspace = TempWorkspace::create_in(tmp_dir)?;
    let staged = workspace.join("INDEX");

    let text: String = records.iter().map(|record| record.to_line(ports_dir)).collect();
    std::fs::write(&staged, text).map_err(|e| CliError::io(&staged, e))?;

    if let Err(e) = std::fs::rename(&staged, output) {
        // Different filesystem: fall back to a copy.
        tracing::debug!(error = %e, "Rename failed, copying staged INDEX");
        std::fs::copy(&staged, output).map_err(|e| CliError::io(output, e))?;
    }

    tracing::info!(output = %output.display(), ports = records.len(), "Wrote INDEX");
    Ok(())
}
