//! A single port's INDEX record.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::field::{FieldKind, PortField, FIELD_SEPARATOR, NFIELDS};
use crate::error::{PkgError, PkgResult};
use crate::package::PackageIdentifier;
use crate::query::{glob_matches, GlobMode, PackageDatabase, QueryMatcher, QueryPattern};

/// Metadata for one port, as found on a line of the ports INDEX.
///
/// Paths below the ports tree (`origin`, `descr_file`) are stored relative
/// to the tree root, which is kept separately so the line can be written
/// back for the same or a different tree.
///
/// Records compare and order by origin only; two records for the same port
/// at different versions are equal.
///
/// # Example
///
/// ```
/// use pkgtools::port::PortRecord;
///
/// let line = "curl-8.5.0|/usr/ports/ftp/curl|/usr/local|Command line tool for transferring data|\
///             /usr/ports/ftp/curl/pkg-descr|sunpoet@FreeBSD.org|ftp net www|\
///             pkgconf-2.1.0|ca_root_nss-3.93|https://curl.se/|curl-8.5.0||\n";
/// let port = PortRecord::parse(line).unwrap();
///
/// assert_eq!(port.origin(), "ftp/curl");
/// assert_eq!(port.ports_dir(), "/usr/ports");
/// assert_eq!(port.descr_file(), Some("ftp/curl/pkg-descr"));
/// assert_eq!(port.category(), Some("ftp"));
/// assert_eq!(port.to_line("/usr/ports"), line);
/// ```
#[derive(Debug, Clone)]
pub struct PortRecord {
    pkgname: PackageIdentifier,
    origin: String,
    prefix: Option<String>,
    comment: Option<String>,
    descr_file: Option<String>,
    maintainer: Option<String>,
    categories: Vec<String>,
    build_depends: Vec<String>,
    run_depends: Vec<String>,
    www: Option<String>,
    extract_depends: Vec<String>,
    patch_depends: Vec<String>,
    fetch_depends: Vec<String>,
    ports_dir: String,
}

/// Split `<root>/<category>/<name>` into `(root, "category/name")`.
fn split_origin(path: &str) -> Option<(&str, &str)> {
    let (head, name) = path.rsplit_once('/')?;
    let (root, category) = head.rsplit_once('/')?;
    if name.is_empty() || category.is_empty() {
        return None;
    }
    Some((root, &path[root.len() + 1..]))
}

/// Join a tree-relative path onto a ports root.
fn join_ports_path(ports_dir: &str, relative: &str) -> String {
    format!("{}/{}", ports_dir.trim_end_matches('/'), relative)
}

fn text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

impl PortRecord {
    /// Parse one INDEX line. A single trailing newline is ignored.
    ///
    /// # Errors
    ///
    /// [`PkgError::Format`] if the line does not have exactly 13 fields, the
    /// package name is not a valid identifier, or the origin is not an
    /// absolute `<ports_dir>/<category>/<name>` path.
    pub fn parse(line: &str) -> PkgResult<Self> {
        let line = match line.strip_suffix('\n') {
            Some(stripped) => stripped.strip_suffix('\r').unwrap_or(stripped),
            None => line,
        };

        let values: Vec<&str> = line.splitn(NFIELDS, FIELD_SEPARATOR).collect();
        if values.len() < NFIELDS || values[NFIELDS - 1].contains(FIELD_SEPARATOR) {
            return Err(PkgError::format(
                line,
                format!("port info line must consist of {} fields", NFIELDS),
            ));
        }
        let value = |field: PortField| values[field.index()];

        let pkgname = PackageIdentifier::parse(value(PortField::PkgName))?;

        let (ports_dir, origin) = split_origin(value(PortField::Origin)).ok_or_else(|| {
            PkgError::format(
                format!("{}: {}", pkgname, value(PortField::Origin)),
                "malformed origin",
            )
        })?;

        let descr_prefix = format!("{}/", ports_dir);
        let descr_file = value(PortField::DescrFile);
        let descr_file = descr_file.strip_prefix(&descr_prefix).unwrap_or(descr_file);

        Ok(Self {
            pkgname,
            origin: origin.to_string(),
            prefix: text(value(PortField::Prefix)),
            comment: text(value(PortField::Comment)),
            descr_file: text(descr_file),
            maintainer: text(value(PortField::Maintainer)),
            categories: list(value(PortField::Categories)),
            build_depends: list(value(PortField::BuildDepends)),
            run_depends: list(value(PortField::RunDepends)),
            www: text(value(PortField::Www)),
            extract_depends: list(value(PortField::ExtractDepends)),
            patch_depends: list(value(PortField::PatchDepends)),
            fetch_depends: list(value(PortField::FetchDepends)),
            ports_dir: ports_dir.to_string(),
        })
    }

    /// Serialize back to an INDEX line rooted at `ports_dir`, newline
    /// terminated.
    ///
    /// Tree-relative paths are prefixed with `ports_dir`; a description file
    /// that lay outside the original tree is written unchanged.
    pub fn to_line(&self, ports_dir: &str) -> String {
        let mut line = PortField::ALL
            .into_iter()
            .map(|field| self.encode(field, ports_dir))
            .collect::<Vec<_>>()
            .join(&FIELD_SEPARATOR.to_string());
        line.push('\n');
        line
    }

    fn encode(&self, field: PortField, ports_dir: &str) -> String {
        match field.kind() {
            FieldKind::Identifier => self.pkgname.to_string(),
            FieldKind::PortsPath => match self.path_field(field) {
                Some(path) if path.starts_with('/') => path.to_string(),
                Some(path) => join_ports_path(ports_dir, path),
                None => String::new(),
            },
            FieldKind::Text => self.text_field(field).unwrap_or_default().to_string(),
            FieldKind::List => self.list_field(field).join(" "),
        }
    }

    fn path_field(&self, field: PortField) -> Option<&str> {
        match field {
            PortField::Origin => Some(&self.origin),
            PortField::DescrFile => self.descr_file.as_deref(),
            _ => None,
        }
    }

    /// Value of a free-text field; `None` for absent values and for fields
    /// that are not free text.
    pub fn text_field(&self, field: PortField) -> Option<&str> {
        match field {
            PortField::Prefix => self.prefix.as_deref(),
            PortField::Comment => self.comment.as_deref(),
            PortField::Maintainer => self.maintainer.as_deref(),
            PortField::Www => self.www.as_deref(),
            _ => None,
        }
    }

    /// Value of a list field; empty for fields that are not lists.
    pub fn list_field(&self, field: PortField) -> &[String] {
        match field {
            PortField::Categories => &self.categories,
            PortField::BuildDepends => &self.build_depends,
            PortField::RunDepends => &self.run_depends,
            PortField::ExtractDepends => &self.extract_depends,
            PortField::PatchDepends => &self.patch_depends,
            PortField::FetchDepends => &self.fetch_depends,
            _ => &[],
        }
    }

    pub fn pkgname(&self) -> &PackageIdentifier {
        &self.pkgname
    }

    /// `category/name` of the port.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Root of the ports tree the record was read from.
    pub fn ports_dir(&self) -> &str {
        &self.ports_dir
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Description file, relative to the ports tree when it lies inside it.
    pub fn descr_file(&self) -> Option<&str> {
        self.descr_file.as_deref()
    }

    pub fn maintainer(&self) -> Option<&str> {
        self.maintainer.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn build_depends(&self) -> &[String] {
        &self.build_depends
    }

    pub fn run_depends(&self) -> &[String] {
        &self.run_depends
    }

    pub fn www(&self) -> Option<&str> {
        self.www.as_deref()
    }

    pub fn extract_depends(&self) -> &[String] {
        &self.extract_depends
    }

    pub fn patch_depends(&self) -> &[String] {
        &self.patch_depends
    }

    pub fn fetch_depends(&self) -> &[String] {
        &self.fetch_depends
    }

    /// Primary category (the first one listed).
    pub fn category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    /// Every dependency of any kind, first occurrence first.
    pub fn all_depends(&self) -> Vec<&str> {
        union(&[
            &self.build_depends,
            &self.run_depends,
            &self.extract_depends,
            &self.patch_depends,
            &self.fetch_depends,
        ])
    }

    /// Dependencies needed to build and run the port.
    pub fn required_depends(&self) -> Vec<&str> {
        union(&[&self.build_depends, &self.run_depends])
    }

    /// Whether the origin alone satisfies `pattern`.
    ///
    /// Globs are matched path-wise: wildcards do not cross `/`, so `www/*`
    /// matches `www/curl` but `*` does not. Date relations never match an
    /// origin.
    pub fn origin_matches(&self, pattern: &QueryPattern) -> bool {
        match pattern {
            QueryPattern::Wildcard => true,
            QueryPattern::Regex(regex) => regex.is_match(&self.origin),
            QueryPattern::Glob(glob) => glob_matches(glob, &self.origin, GlobMode::Pathname),
            QueryPattern::DateRelation { .. } => false,
        }
    }

    /// Whether the port satisfies `pattern` by origin or by package name.
    pub fn matches<D>(&self, pattern: &QueryPattern, matcher: &QueryMatcher<'_, D>) -> bool
    where
        D: PackageDatabase + ?Sized,
    {
        self.origin_matches(pattern) || matcher.matches(&self.pkgname, pattern)
    }

    /// Order this record's origin against a bare origin string.
    pub fn cmp_origin(&self, origin: &str) -> Ordering {
        self.origin.as_str().cmp(origin)
    }
}

fn union<'a>(lists: &[&'a Vec<String>]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|list| list.iter())
        .map(String::as_str)
        .filter(|dep| seen.insert(*dep))
        .collect()
}

impl PartialEq for PortRecord {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
    }
}

impl Eq for PortRecord {}

impl Ord for PortRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.origin.cmp(&other.origin)
    }
}

impl PartialOrd for PortRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for PortRecord {
    type Err = PkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Writes the INDEX line for the record's own ports tree, without the
/// trailing newline.
impl fmt::Display for PortRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.to_line(&self.ports_dir);
        f.write_str(line.trim_end_matches('\n'))
    }
}
