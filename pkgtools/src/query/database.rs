//! Installation date lookups used by date-relation queries.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{PkgError, PkgResult};
use crate::package::PackageIdentifier;

/// Source of package installation dates.
///
/// Implemented by whatever knows about installed packages: the on-disk
/// package database, `pkg query %t`, or an in-memory table.
pub trait PackageDatabase {
    /// When `pkg` was installed. `pkg` is a full `<name>-<version>` or a bare
    /// package name. `None` if the package is not installed.
    fn date_installed(&self, pkg: &str) -> Option<DateTime<Local>>;

    /// Parse an absolute date given in a query.
    fn parse_date(&self, input: &str) -> PkgResult<DateTime<Local>> {
        parse_date(input)
    }
}

impl<D: PackageDatabase + ?Sized> PackageDatabase for &D {
    fn date_installed(&self, pkg: &str) -> Option<DateTime<Local>> {
        (**self).date_installed(pkg)
    }

    fn parse_date(&self, input: &str) -> PkgResult<DateTime<Local>> {
        (**self).parse_date(input)
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a date or date-time in local time.
///
/// Accepts RFC 3339 (`2024-01-31T12:00:00+01:00`), `YYYY-MM-DD`,
/// `YYYY/MM/DD`, and the date forms followed by `HH:MM[:SS]`.
/// A date without a time means midnight.
///
/// # Errors
///
/// [`PkgError::InvalidDate`] when no format matches.
///
/// ```
/// use chrono::{Datelike, Timelike};
/// use pkgtools::query::parse_date;
///
/// let when = parse_date("2024-03-01 13:45").unwrap();
/// assert_eq!((when.month(), when.day(), when.hour()), (3, 1, 13));
/// ```
pub fn parse_date(input: &str) -> PkgResult<DateTime<Local>> {
    let input = input.trim();
    let invalid = || PkgError::InvalidDate {
        input: input.to_string(),
    };

    if let Ok(when) = DateTime::parse_from_rfc3339(input) {
        return Ok(when.with_timezone(&Local));
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(invalid)?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(invalid)
}

/// In-memory table of installation dates.
///
/// ```
/// use pkgtools::package::PackageIdentifier;
/// use pkgtools::query::{parse_date, InstallDates, PackageDatabase};
///
/// let mut dates = InstallDates::new();
/// let curl: PackageIdentifier = "curl-8.5.0".parse().unwrap();
/// dates.insert(&curl, parse_date("2024-01-10").unwrap());
///
/// assert!(dates.date_installed("curl-8.5.0").is_some());
/// assert!(dates.date_installed("curl").is_some());
/// assert!(dates.date_installed("wget").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstallDates {
    dates: HashMap<String, DateTime<Local>>,
    /// Bare name to full identifier.
    names: HashMap<String, String>,
    packages: BTreeSet<PackageIdentifier>,
}

impl InstallDates {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record when `pkg` was installed.
    pub fn insert(&mut self, pkg: &PackageIdentifier, when: DateTime<Local>) {
        let fullname = pkg.fullname();
        self.names.insert(pkg.name().to_string(), fullname.clone());
        self.dates.insert(fullname, when);
        self.packages.insert(pkg.clone());
    }

    /// Packages in the table, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &PackageIdentifier> {
        self.packages.iter()
    }

    /// Number of packages in the table.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Parse a listing of `<pkgname> <when>` lines.
    ///
    /// `<when>` is either Unix seconds (as printed by `pkg query '%n-%v %t'`)
    /// or anything [`parse_date`] accepts. Blank lines and `#` comments are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed line.
    pub fn parse_listing(text: &str) -> PkgResult<Self> {
        let mut dates = Self::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (pkg, when) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| PkgError::format(line, "expected <pkgname> <date>"))?;
            let pkg = PackageIdentifier::parse(pkg)?;
            let when = when.trim();

            let when = if !when.is_empty() && when.bytes().all(|b| b.is_ascii_digit()) {
                when.parse::<i64>()
                    .ok()
                    .and_then(|secs| Local.timestamp_opt(secs, 0).single())
                    .ok_or_else(|| PkgError::InvalidDate {
                        input: when.to_string(),
                    })?
            } else {
                parse_date(when)?
            };

            dates.insert(&pkg, when);
        }

        Ok(dates)
    }
}

impl PackageDatabase for InstallDates {
    fn date_installed(&self, pkg: &str) -> Option<DateTime<Local>> {
        self.dates
            .get(pkg)
            .or_else(|| self.names.get(pkg).and_then(|full| self.dates.get(full)))
            .copied()
    }
}
