//! Evaluation of query patterns against packages.

use std::cmp::Ordering;
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Local};

use super::database::PackageDatabase;
use super::pattern::{glob_matches, GlobMode, QueryPattern};
use crate::error::PkgResult;
use crate::package::PackageIdentifier;

/// Decides whether packages satisfy a [`QueryPattern`].
///
/// Date relations need installation dates, so the matcher borrows a
/// [`PackageDatabase`]. Other pattern forms never consult it.
///
/// # Example
///
/// ```
/// use pkgtools::package::PackageIdentifier;
/// use pkgtools::query::{InstallDates, QueryMatcher, QueryPattern};
///
/// let dates = InstallDates::new();
/// let matcher = QueryMatcher::new(&dates);
/// let pkg: PackageIdentifier = "foo-1.0".parse().unwrap();
///
/// assert!(matcher.matches(&pkg, &QueryPattern::parse("foo-*")));
/// assert!(matcher.matches(&pkg, &QueryPattern::parse("foo")));
/// assert!(!matcher.matches(&pkg, &QueryPattern::parse("bar-*")));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryMatcher<'db, D: ?Sized> {
    db: &'db D,
}

impl<'db, D: PackageDatabase + ?Sized> QueryMatcher<'db, D> {
    /// Create a matcher backed by `db`.
    pub fn new(db: &'db D) -> Self {
        Self { db }
    }

    /// Whether `pkg` satisfies `pattern`.
    ///
    /// Never fails: if a date relation cannot be evaluated the problem is
    /// logged and the package does not match.
    pub fn matches(&self, pkg: &PackageIdentifier, pattern: &QueryPattern) -> bool {
        self.matches_target(&pkg.fullname(), pkg.name(), pattern)
    }

    /// Like [`matches`](Self::matches), for a raw string.
    ///
    /// A string that parses as an identifier behaves exactly like the parsed
    /// identifier. Anything else (a bare name, an origin) is used as both the
    /// full name and the name.
    pub fn matches_str(&self, target: &str, pattern: &QueryPattern) -> bool {
        match PackageIdentifier::parse(target) {
            Ok(pkg) => self.matches(&pkg, pattern),
            Err(_) => self.matches_target(target, target, pattern),
        }
    }

    /// Fallible variant of [`matches`](Self::matches).
    ///
    /// # Errors
    ///
    /// Fails when a date relation cannot be evaluated because the reference
    /// is neither an installed package nor a date.
    pub fn try_matches(&self, pkg: &PackageIdentifier, pattern: &QueryPattern) -> PkgResult<bool> {
        self.try_matches_target(&pkg.fullname(), pkg.name(), pattern)
    }

    /// Keep the packages that satisfy `pattern`, in their original order.
    pub fn select<'a, I>(&self, pkgs: I, pattern: &QueryPattern) -> Vec<&'a PackageIdentifier>
    where
        I: IntoIterator<Item = &'a PackageIdentifier>,
    {
        pkgs.into_iter()
            .filter(|pkg| self.matches(pkg, pattern))
            .collect()
    }

    fn matches_target(&self, fullname: &str, name: &str, pattern: &QueryPattern) -> bool {
        match self.try_matches_target(fullname, name, pattern) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(
                    package = fullname,
                    pattern = %pattern,
                    error = %e,
                    "Query pattern could not be evaluated; treating as no match"
                );
                false
            }
        }
    }

    fn try_matches_target(
        &self,
        fullname: &str,
        name: &str,
        pattern: &QueryPattern,
    ) -> PkgResult<bool> {
        match pattern {
            QueryPattern::Wildcard => Ok(true),
            QueryPattern::Regex(regex) => Ok(regex.is_match(fullname)),
            QueryPattern::DateRelation {
                op,
                inclusive,
                reference,
            } => {
                let cmp = self.date_cmp(fullname, reference)?;
                Ok(op.holds(cmp, *inclusive))
            }
            QueryPattern::Glob(glob) => {
                Ok(glob_matches(glob, fullname, GlobMode::Plain) || name == glob)
            }
        }
    }

    /// Installation date of `fullname` compared with the reference instant.
    /// A package that is not installed counts as installed at the epoch.
    fn date_cmp(&self, fullname: &str, reference: &str) -> PkgResult<Ordering> {
        let installed = self
            .db
            .date_installed(fullname)
            .unwrap_or_else(|| DateTime::<Local>::from(UNIX_EPOCH));

        let base = match self.db.date_installed(reference) {
            Some(base) => base,
            None => self.db.parse_date(reference)?,
        };

        Ok(installed.cmp(&base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::database::{parse_date, InstallDates};
    use regex::Regex;

    fn id(s: &str) -> PackageIdentifier {
        PackageIdentifier::parse(s).unwrap()
    }

    fn pattern(s: &str) -> QueryPattern {
        QueryPattern::parse(s)
    }

    /// foo-1.0 installed 2020-06-01, bar-2.0 installed 2020-01-01 00:00.
    fn sample_dates() -> InstallDates {
        let mut dates = InstallDates::new();
        dates.insert(&id("foo-1.0"), parse_date("2020-06-01").unwrap());
        dates.insert(&id("bar-2.0"), parse_date("2020-01-01").unwrap());
        dates
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let dates = InstallDates::new();
        let matcher = QueryMatcher::new(&dates);
        assert!(matcher.matches(&id("foo-1.0"), &pattern("*")));
        assert!(matcher.matches(&id("foo-1.0"), &QueryPattern::Wildcard));
        assert!(matcher.matches_str("not an identifier", &QueryPattern::Wildcard));
    }

    #[test]
    fn test_glob_over_full_identifier() {
        let dates = InstallDates::new();
        let matcher = QueryMatcher::new(&dates);
        assert!(matcher.matches(&id("foo-1.0"), &pattern("foo-*")));
        assert!(matcher.matches(&id("foo-1.0"), &pattern("f?o-1.[0-9]")));
        assert!(!matcher.matches(&id("foo-1.0"), &pattern("bar-*")));
        assert!(!matcher.matches(&id("foo-1.0"), &pattern("foo-2*")));
    }

    #[test]
    fn test_exact_name_fallback() {
        let dates = InstallDates::new();
        let matcher = QueryMatcher::new(&dates);
        assert!(matcher.matches(&id("foo-1.0"), &pattern("foo")));
        assert!(matcher.matches(&id("p5-libwww-6.72"), &pattern("p5-libwww")));
        assert!(!matcher.matches(&id("foo-1.0"), &pattern("fo")));
    }

    #[test]
    fn test_unclosed_bracket_glob_matches_literally() {
        let dates = InstallDates::new();
        let matcher = QueryMatcher::new(&dates);
        assert!(matcher.matches_str("c[", &pattern("c[")));
        assert!(!matcher.matches(&id("foo-1.0"), &pattern("foo[")));
    }

    #[test]
    fn test_regex_is_unanchored_search() {
        let dates = InstallDates::new();
        let matcher = QueryMatcher::new(&dates);
        let pkg = id("py311-requests-2.31.0");
        let re = |s: &str| QueryPattern::from(Regex::new(s).unwrap());

        assert!(matcher.matches(&pkg, &re("requests")));
        assert!(matcher.matches(&pkg, &re(r"^py3\d+-")));
        assert!(matcher.matches(&pkg, &re(r"-2\.31\.0$")));
        assert!(!matcher.matches(&pkg, &re("^requests")));
    }

    #[test]
    fn test_date_relation_against_absolute_date() {
        let dates = sample_dates();
        let matcher = QueryMatcher::new(&dates);
        let foo = id("foo-1.0");
        let bar = id("bar-2.0");

        assert!(matcher.matches(&foo, &pattern(">2020-01-01")));
        assert!(!matcher.matches(&bar, &pattern(">2020-01-01")));
        assert!(matcher.matches(&bar, &pattern(">=2020-01-01")));
        assert!(matcher.matches(&bar, &pattern("<=2020-01-01")));
        assert!(!matcher.matches(&bar, &pattern("<2020-01-01")));
        assert!(!matcher.matches(&foo, &pattern("<=2020-01-01")));
    }

    #[test]
    fn test_date_relation_against_other_package() {
        let dates = sample_dates();
        let matcher = QueryMatcher::new(&dates);

        assert!(matcher.matches(&id("foo-1.0"), &pattern(">bar-2.0")));
        assert!(matcher.matches(&id("foo-1.0"), &pattern(">bar")));
        assert!(matcher.matches(&id("bar-2.0"), &pattern("<foo")));
        assert!(matcher.matches(&id("bar-2.0"), &pattern(">=bar")));
        assert!(!matcher.matches(&id("bar-2.0"), &pattern(">bar")));
    }

    #[test]
    fn test_date_relation_failures_do_not_match() {
        let dates = sample_dates();
        let matcher = QueryMatcher::new(&dates);

        // Unparseable reference.
        assert!(!matcher.matches(&id("foo-1.0"), &pattern(">someday")));
        assert!(matcher.try_matches(&id("foo-1.0"), &pattern(">someday")).is_err());

        // Unparseable reference, target not installed.
        assert!(!matcher.matches(&id("baz-1.0"), &pattern("<someday")));
    }

    #[test]
    fn test_uninstalled_package_dates_from_epoch() {
        let dates = sample_dates();
        let matcher = QueryMatcher::new(&dates);
        let baz = id("baz-1.0");

        assert!(matcher.matches(&baz, &pattern("<2000-01-01")));
        assert!(matcher.matches(&baz, &pattern("<=bar")));
        assert!(!matcher.matches(&baz, &pattern(">2000-01-01")));
        assert_eq!(matcher.try_matches(&baz, &pattern(">2000-01-01")), Ok(false));
        assert!(matcher.matches_str("baz", &pattern("<foo")));
    }

    #[test]
    fn test_matches_str_on_bare_names() {
        let dates = sample_dates();
        let matcher = QueryMatcher::new(&dates);

        assert!(matcher.matches_str("foo-1.0", &pattern("foo")));
        assert!(matcher.matches_str("foo", &pattern("foo")));
        assert!(matcher.matches_str("foo", &pattern(">2020-01-01")));
        assert!(!matcher.matches_str("editors/vim", &pattern("vim")));
        assert!(matcher.matches_str("editors/vim", &pattern("editors/*")));
    }

    #[test]
    fn test_select_preserves_order() {
        let dates = sample_dates();
        let matcher = QueryMatcher::new(&dates);
        let pkgs = vec![id("foo-1.0"), id("bar-2.0"), id("foo-bar-3.0")];

        let selected = matcher.select(&pkgs, &pattern("foo*"));
        let names: Vec<_> = selected.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["foo-1.0", "foo-bar-3.0"]);
    }

    #[test]
    fn test_matcher_over_trait_object() {
        let dates = sample_dates();
        let db: &dyn PackageDatabase = &dates;
        let matcher = QueryMatcher::new(db);
        assert!(matcher.matches(&id("foo-1.0"), &pattern(">bar")));
    }
}
