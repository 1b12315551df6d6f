//! Package identifier type.
//!
//! The [`PackageIdentifier`] struct is the `<name>-<version>` designation of
//! an installed package or a built port, e.g. `p5-libwww-6.72_1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{PkgError, PkgResult};
use crate::port::PortRecord;
use crate::version::PkgVersion;

/// A package name and version pair.
///
/// The version is everything after the last `-`; names may contain dashes
/// themselves. Identifiers order by name first, then by version.
///
/// # Example
///
/// ```
/// use pkgtools::package::PackageIdentifier;
///
/// let pkg: PackageIdentifier = "p5-libwww-6.72_1".parse().unwrap();
///
/// assert_eq!(pkg.name(), "p5-libwww");
/// assert_eq!(pkg.version().to_string(), "6.72_1");
/// assert_eq!(pkg.to_string(), "p5-libwww-6.72_1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageIdentifier {
    // Field order matters: the derived Ord compares name before version.
    name: String,
    version: PkgVersion,
}

/// Right-hand side of [`PackageIdentifier::compare`].
///
/// A closed set of operand shapes. Raw strings are classified on use: with a
/// `-` they are parsed as identifiers, without one as bare versions.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// Another identifier; compares name, then version.
    Identifier(&'a PackageIdentifier),
    /// A bare version; compares the version only.
    Version(&'a PkgVersion),
    /// An unparsed string.
    Raw(&'a str),
    /// A port record. Ports order by origin, which an identifier does not
    /// carry, so this comparison is always rejected.
    Port(&'a PortRecord),
}

impl Operand<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Operand::Identifier(_) => "package identifier",
            Operand::Version(_) => "version",
            Operand::Raw(_) => "string",
            Operand::Port(_) => "port record",
        }
    }
}

impl<'a> From<&'a PackageIdentifier> for Operand<'a> {
    fn from(id: &'a PackageIdentifier) -> Self {
        Operand::Identifier(id)
    }
}

impl<'a> From<&'a PkgVersion> for Operand<'a> {
    fn from(version: &'a PkgVersion) -> Self {
        Operand::Version(version)
    }
}

impl<'a> From<&'a str> for Operand<'a> {
    fn from(raw: &'a str) -> Self {
        Operand::Raw(raw)
    }
}

impl<'a> From<&'a PortRecord> for Operand<'a> {
    fn from(port: &'a PortRecord) -> Self {
        Operand::Port(port)
    }
}

impl PackageIdentifier {
    /// Build an identifier from its parts.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty or contains whitespace.
    pub fn new(name: impl Into<String>, version: PkgVersion) -> PkgResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(PkgError::format(
                format!("-{}", version),
                "not in <name>-<version> form",
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(PkgError::format(
                format!("{}-{}", name, version),
                "contains whitespace",
            ));
        }
        Ok(Self { name, version })
    }

    /// Parse a `<name>-<version>` string.
    ///
    /// # Errors
    ///
    /// [`PkgError::Format`] if the input contains whitespace, has no `-`
    /// separating a non-empty name from a non-empty version, or the version
    /// part is malformed.
    pub fn parse(s: &str) -> PkgResult<Self> {
        if s.chars().any(char::is_whitespace) {
            return Err(PkgError::format(s, "contains whitespace"));
        }

        let (name, version) = s
            .rsplit_once('-')
            .filter(|(name, version)| !name.is_empty() && !version.is_empty())
            .ok_or_else(|| PkgError::format(s, "not in <name>-<version> form"))?;

        let version = PkgVersion::parse(version).map_err(|e| match e {
            PkgError::Format { reason, .. } => PkgError::format(s, reason),
            other => other,
        })?;

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }

    /// Package name without the version.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version.
    pub fn version(&self) -> &PkgVersion {
        &self.version
    }

    /// Full `<name>-<version>` form, same as `to_string()`.
    pub fn fullname(&self) -> String {
        self.to_string()
    }

    /// Compare against an identifier, a version, or a raw string.
    ///
    /// Identifiers compare name first and then version; versions, and raw
    /// strings without a `-`, compare the version only.
    ///
    /// # Errors
    ///
    /// Fails if a raw operand does not parse, or with
    /// [`PkgError::UnsupportedComparison`] for a [`PortRecord`].
    ///
    /// # Example
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use pkgtools::package::PackageIdentifier;
    ///
    /// let pkg: PackageIdentifier = "curl-8.5.0".parse().unwrap();
    ///
    /// assert_eq!(pkg.compare("curl-8.4.0").unwrap(), Ordering::Greater);
    /// assert_eq!(pkg.compare("8.5.0").unwrap(), Ordering::Equal);
    /// assert_eq!(pkg.compare("wget-1.0").unwrap(), Ordering::Less);
    /// ```
    pub fn compare<'a>(&self, other: impl Into<Operand<'a>>) -> PkgResult<Ordering> {
        match other.into() {
            Operand::Identifier(id) => Ok(self.cmp(id)),
            Operand::Version(version) => Ok(self.version.cmp(version)),
            Operand::Raw(raw) if raw.contains('-') => Ok(self.cmp(&Self::parse(raw)?)),
            Operand::Raw(raw) => Ok(self.version.cmp(&PkgVersion::parse(raw)?)),
            other @ Operand::Port(_) => Err(PkgError::UnsupportedComparison {
                left: "package identifier".to_string(),
                right: other.describe().to_string(),
            }),
        }
    }

    /// Shorthand for [`compare`](Self::compare) with a raw string.
    pub fn compare_str(&self, other: &str) -> PkgResult<Ordering> {
        self.compare(other)
    }
}

impl FromStr for PackageIdentifier {
    type Err = PkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Textual equality with `<name>-<version>`.
impl PartialEq<str> for PackageIdentifier {
    fn eq(&self, other: &str) -> bool {
        other
            .rsplit_once('-')
            .is_some_and(|(name, version)| name == self.name && version == self.version.as_str())
    }
}

impl PartialEq<&str> for PackageIdentifier {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}
