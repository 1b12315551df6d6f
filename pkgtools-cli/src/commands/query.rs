//! `match`: select installed packages with query patterns.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pkgtools::config::ConfigFile;
use pkgtools::package::PackageIdentifier;
use pkgtools::query::{InstallDates, PackageDatabase, QueryMatcher, QueryPattern};

use super::emit;
use crate::error::CliError;
use crate::pkgdb::FsPackageDatabase;

#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Patterns: `*`, a glob, a package name, or `<`/`>`[=] date or package
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Treat every pattern as a regular expression
    #[arg(short = 'x', long)]
    pub regex: bool,

    /// Read `<pkgname> <date>` lines from FILE instead of the package database
    #[arg(long, value_name = "FILE")]
    pub dates: Option<PathBuf>,
}

/// Compile the command-line patterns.
pub fn parse_patterns(patterns: &[String], regex: bool) -> Result<Vec<QueryPattern>, CliError> {
    patterns
        .iter()
        .map(|pattern| {
            if regex {
                QueryPattern::regex(pattern).map_err(CliError::from)
            } else {
                Ok(QueryPattern::parse(pattern))
            }
        })
        .collect()
}

/// Print every installed package matching at least one pattern.
pub fn run(args: &MatchArgs, config: &ConfigFile, out: &mut dyn Write) -> Result<(), CliError> {
    let patterns = parse_patterns(&args.patterns, args.regex)?;

    let (db, installed): (Box<dyn PackageDatabase>, Vec<PackageIdentifier>) = match &args.dates
    {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
            let dates = InstallDates::parse_listing(&text)?;
            let installed = dates.packages().cloned().collect();
            (Box::new(dates), installed)
        }
        None => {
            let db = FsPackageDatabase::new(&config.paths.pkg_dbdir);
            let installed = db.installed()?;
            (Box::new(db), installed)
        }
    };

    tracing::debug!(
        installed = installed.len(),
        patterns = patterns.len(),
        "Matching installed packages"
    );

    let matcher = QueryMatcher::new(db.as_ref());
    for pkg in &installed {
        if patterns.iter().any(|pattern| matcher.matches(pkg, pattern)) {
            emit(out, pkg)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::output_of;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn match_args(patterns: &[&str], dates: Option<PathBuf>) -> MatchArgs {
        MatchArgs {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            regex: false,
            dates,
        }
    }

    fn dates_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("dates");
        std::fs::write(
            &path,
            "bash-5.2.21 2023-11-02\ncurl-8.5.0 2024-01-15\ngit-2.44.0 2024-03-01\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_match_from_dates_file() {
        let dir = TempDir::new().unwrap();
        let args = match_args(&[">=2024-01-01"], Some(dates_file(&dir)));

        let out = output_of(|out| run(&args, &ConfigFile::default(), out));
        assert_eq!(out, "curl-8.5.0\ngit-2.44.0\n");
    }

    #[test]
    fn test_any_pattern_matches() {
        let dir = TempDir::new().unwrap();
        let args = match_args(&["bash", "g*"], Some(dates_file(&dir)));

        let out = output_of(|out| run(&args, &ConfigFile::default(), out));
        assert_eq!(out, "bash-5.2.21\ngit-2.44.0\n");
    }

    #[test]
    fn test_regex_patterns() {
        let dir = TempDir::new().unwrap();
        let mut args = match_args(&["^c.*-8\\."], Some(dates_file(&dir)));
        args.regex = true;

        let out = output_of(|out| run(&args, &ConfigFile::default(), out));
        assert_eq!(out, "curl-8.5.0\n");

        assert!(parse_patterns(&["(".to_string()], true).is_err());
    }

    #[test]
    fn test_match_from_package_database() {
        let dbdir = TempDir::new().unwrap();
        for (name, secs) in [("old-1.0", 1_500_000_000), ("new-2.0", 1_700_000_000)] {
            let dir = dbdir.path().join(name);
            std::fs::create_dir(&dir).unwrap();
            std::fs::write(dir.join("+COMMENT"), "x").unwrap();
            filetime::set_file_mtime(dir.join("+COMMENT"), FileTime::from_unix_time(secs, 0))
                .unwrap();
        }

        let mut config = ConfigFile::default();
        config.paths.pkg_dbdir = dbdir.path().to_path_buf();

        let out = output_of(|out| run(&match_args(&[">old"], None), &config, out));
        assert_eq!(out, "new-2.0\n");

        let out = output_of(|out| run(&match_args(&["*"], None), &config, out));
        assert_eq!(out, "new-2.0\nold-1.0\n");
    }
}
