//! Package and port selection queries.
//!
//! Command-line tools accept package selectors in a small query language.
//! A selector is classified by its shape, in this order:
//!
//! 1. `*` (or [`QueryPattern::Wildcard`]) selects everything.
//! 2. A compiled regular expression is searched for in `<name>-<version>`.
//! 3. `<`, `<=`, `>` or `>=` followed by a date or a package name selects by
//!    installation date relative to that date, or to when that package was
//!    installed. A package that is not installed dates from the Unix epoch.
//! 4. Anything else is a shell glob over `<name>-<version>`, and also
//!    matches a package whose name equals it exactly.
//!
//! Evaluation never aborts a scan: a selector that cannot be evaluated for
//! some package is logged and simply does not match it.

mod database;
mod matcher;
mod pattern;

pub use database::{parse_date, InstallDates, PackageDatabase};
pub use matcher::QueryMatcher;
pub use pattern::{glob_matches, DateOp, GlobMode, QueryPattern};
