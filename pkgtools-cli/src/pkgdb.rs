//! On-disk package database (`/var/db/pkg/<name>-<version>/`).
//!
//! Each installed package owns a directory holding its metadata files.
//! The installation date is taken from the modification time of the first
//! metadata file that exists.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use pkgtools::package::PackageIdentifier;
use pkgtools::query::PackageDatabase;

use crate::error::CliError;

/// Metadata files checked for the installation date, in order.
const DATE_FILES: &[&str] = &["+COMMENT", "+DESC", "+CONTENTS"];

/// Package database rooted at a directory of per-package subdirectories.
#[derive(Debug, Clone)]
pub struct FsPackageDatabase {
    dbdir: PathBuf,
    /// Directory listing used for bare-name lookups, read at most once.
    scanned: OnceLock<Vec<PackageIdentifier>>,
}

impl FsPackageDatabase {
    pub fn new(dbdir: impl Into<PathBuf>) -> Self {
        Self {
            dbdir: dbdir.into(),
            scanned: OnceLock::new(),
        }
    }

    pub fn dbdir(&self) -> &Path {
        &self.dbdir
    }

    /// Installed packages, sorted. Entries that are not valid identifiers
    /// are skipped.
    pub fn installed(&self) -> Result<Vec<PackageIdentifier>, CliError> {
        let entries =
            std::fs::read_dir(&self.dbdir).map_err(|e| CliError::io(&self.dbdir, e))?;

        let mut pkgs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CliError::io(&self.dbdir, e))?;
            if !entry.path().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            match PackageIdentifier::parse(&name) {
                Ok(pkg) => pkgs.push(pkg),
                Err(e) => tracing::debug!(entry = %name, error = %e, "Skipping database entry"),
            }
        }

        pkgs.sort();
        Ok(pkgs)
    }

    /// Directory of `pkg`, given as a full identifier or a bare name.
    fn package_dir(&self, pkg: &str) -> Option<PathBuf> {
        if pkg.is_empty() || pkg.contains('/') {
            return None;
        }

        let dir = self.dbdir.join(pkg);
        if dir.is_dir() {
            return Some(dir);
        }

        self.scanned()
            .iter()
            .find(|installed| installed.name() == pkg)
            .map(|installed| self.dbdir.join(installed.fullname()))
    }

    fn scanned(&self) -> &[PackageIdentifier] {
        self.scanned.get_or_init(|| {
            self.installed().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Cannot scan package database");
                Vec::new()
            })
        })
    }
}

impl PackageDatabase for FsPackageDatabase {
    fn date_installed(&self, pkg: &str) -> Option<DateTime<Local>> {
        let dir = self.package_dir(pkg)?;

        DATE_FILES
            .iter()
            .find_map(|file| std::fs::metadata(dir.join(file)).ok())
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Local>::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn add_package(root: &Path, fullname: &str, file: &str, unix_secs: i64) {
        let dir = root.join(fullname);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        std::fs::write(&path, "x").unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
    }

    #[test]
    fn test_installed_lists_valid_entries() {
        let root = TempDir::new().unwrap();
        add_package(root.path(), "zsh-5.9", "+COMMENT", 1_700_000_000);
        add_package(root.path(), "bash-5.2.21", "+DESC", 1_700_000_000);
        std::fs::create_dir(root.path().join("not a package")).unwrap();
        std::fs::write(root.path().join("stray-1.0"), "").unwrap();

        let db = FsPackageDatabase::new(root.path());
        let names: Vec<String> = db.installed().unwrap().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["bash-5.2.21", "zsh-5.9"]);
    }

    #[test]
    fn test_date_from_metadata_mtime() {
        let root = TempDir::new().unwrap();
        add_package(root.path(), "curl-8.5.0", "+CONTENTS", 1_700_000_000);

        let db = FsPackageDatabase::new(root.path());
        let expected = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(db.date_installed("curl-8.5.0"), Some(expected));
        assert_eq!(db.date_installed("curl"), Some(expected));
        assert_eq!(db.date_installed("wget"), None);
        assert_eq!(db.date_installed("../curl-8.5.0"), None);
    }

    #[test]
    fn test_comment_file_wins() {
        let root = TempDir::new().unwrap();
        add_package(root.path(), "git-2.44.0", "+CONTENTS", 1_600_000_000);
        add_package(root.path(), "git-2.44.0", "+COMMENT", 1_700_000_000);

        let db = FsPackageDatabase::new(root.path());
        let expected = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(db.date_installed("git-2.44.0"), Some(expected));
    }

    #[test]
    fn test_bare_names_resolve_from_one_scan() {
        let root = TempDir::new().unwrap();
        add_package(root.path(), "curl-8.5.0", "+COMMENT", 1_700_000_000);

        let db = FsPackageDatabase::new(root.path());
        assert_eq!(db.date_installed("wget"), None);
        assert!(db.date_installed("curl").is_some());

        // installed after the listing was read
        add_package(root.path(), "wget-1.21.4", "+COMMENT", 1_700_000_000);
        assert_eq!(db.date_installed("wget"), None);
        assert!(db.date_installed("wget-1.21.4").is_some());
        assert_eq!(db.installed().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_dbdir() {
        let root = TempDir::new().unwrap();
        let db = FsPackageDatabase::new(root.path().join("missing"));
        assert!(matches!(db.installed(), Err(CliError::Io { .. })));
        assert_eq!(db.date_installed("foo"), None);
    }
}
