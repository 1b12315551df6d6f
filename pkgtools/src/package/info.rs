//! Package information queries.
//!
//! Information about installed packages comes from the package tools
//! (`pkg query` on pkgng systems, `pkg_info` on legacy ones). This module
//! knows which flag or format string selects each piece of information and
//! builds the shell command line for it; running the command is left to the
//! caller.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::PackageIdentifier;
use crate::error::{PkgError, PkgResult};
use crate::shell;

/// Path of the pkgng `pkg` binary.
pub const PKG_COMMAND: &str = "/usr/sbin/pkg";

/// Path of the legacy `pkg_info` binary.
pub const PKG_INFO_COMMAND: &str = "/usr/sbin/pkg_info";

/// Which package tool set is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageBackend {
    /// pkg(8), queried with `pkg query <format>`.
    #[default]
    Pkgng,
    /// pkg_install, queried with `pkg_info -q<flag>`.
    Legacy,
}

impl PackageBackend {
    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            PackageBackend::Pkgng => "pkgng",
            PackageBackend::Legacy => "legacy",
        }
    }
}

impl fmt::Display for PackageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageBackend {
    type Err = PkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pkgng" | "pkg" => Ok(PackageBackend::Pkgng),
            "legacy" | "pkg_install" => Ok(PackageBackend::Legacy),
            _ => Err(PkgError::format(s, "unknown package backend")),
        }
    }
}

/// A piece of information that can be queried for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoField {
    Prefix,
    Comment,
    Descr,
    Message,
    Plist,
    Install,
    Deinstall,
    Req,
    RequiredBy,
    Mtree,
    Mtime,
    Files,
    TotalSize,
    Origin,
}

impl InfoField {
    /// Every field, in table order.
    pub const ALL: [InfoField; 14] = [
        InfoField::Prefix,
        InfoField::Comment,
        InfoField::Descr,
        InfoField::Message,
        InfoField::Plist,
        InfoField::Install,
        InfoField::Deinstall,
        InfoField::Req,
        InfoField::RequiredBy,
        InfoField::Mtree,
        InfoField::Mtime,
        InfoField::Files,
        InfoField::TotalSize,
        InfoField::Origin,
    ];

    /// Lowercase name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            InfoField::Prefix => "prefix",
            InfoField::Comment => "comment",
            InfoField::Descr => "descr",
            InfoField::Message => "message",
            InfoField::Plist => "plist",
            InfoField::Install => "install",
            InfoField::Deinstall => "deinstall",
            InfoField::Req => "req",
            InfoField::RequiredBy => "required_by",
            InfoField::Mtree => "mtree",
            InfoField::Mtime => "mtime",
            InfoField::Files => "files",
            InfoField::TotalSize => "totalsize",
            InfoField::Origin => "origin",
        }
    }

    /// `pkg_info -q` flag letter, if the legacy tools provide this field.
    pub fn legacy_flag(&self) -> Option<char> {
        match self {
            InfoField::Prefix => Some('p'),
            InfoField::Comment => Some('c'),
            InfoField::Descr => Some('d'),
            InfoField::Message => Some('D'),
            InfoField::Plist => Some('f'),
            InfoField::Install => Some('i'),
            InfoField::Deinstall => Some('k'),
            InfoField::Req => Some('r'),
            InfoField::RequiredBy => Some('R'),
            InfoField::Mtree => Some('m'),
            InfoField::Mtime => None,
            InfoField::Files => Some('L'),
            InfoField::TotalSize => Some('s'),
            InfoField::Origin => Some('o'),
        }
    }

    /// `pkg query` format string, if pkgng provides this field.
    pub fn query_format(&self) -> Option<&'static str> {
        match self {
            InfoField::Prefix => Some("%p"),
            InfoField::Comment => Some("%c"),
            InfoField::Message => Some("%M"),
            InfoField::Req => Some("%dn-%dv"),
            InfoField::RequiredBy => Some("%rn-%rv"),
            InfoField::Mtime => Some("%t"),
            InfoField::Files => Some("%Fp"),
            InfoField::TotalSize => Some("%sb"),
            InfoField::Origin => Some("%o"),
            InfoField::Descr
            | InfoField::Plist
            | InfoField::Install
            | InfoField::Deinstall
            | InfoField::Mtree => None,
        }
    }
}

impl fmt::Display for InfoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InfoField {
    type Err = PkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InfoField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| PkgError::format(s, "unknown package information field"))
    }
}

/// Build the command line that prints `field` for `pkg`.
///
/// `pkg` is an installed package name or a path to a package file. For a
/// path, the command first changes into the file's directory.
///
/// # Errors
///
/// Fails if `backend` cannot provide `field`.
///
/// # Example
///
/// ```
/// use pkgtools::package::{info_command, InfoField, PackageBackend};
///
/// let cmd = info_command(PackageBackend::Pkgng, "curl-8.5.0", InfoField::Req).unwrap();
/// assert_eq!(cmd, "env PKG_PATH= /usr/sbin/pkg query %dn-%dv curl-8.5.0 2>/dev/null");
///
/// let cmd = info_command(PackageBackend::Legacy, "curl-8.5.0", InfoField::Origin).unwrap();
/// assert_eq!(cmd, "env PKG_PATH= /usr/sbin/pkg_info -qo curl-8.5.0 2>/dev/null");
/// ```
pub fn info_command(backend: PackageBackend, pkg: &str, field: InfoField) -> PkgResult<String> {
    let unsupported = || {
        PkgError::format(
            field.name(),
            format!("information not supported by the {} backend", backend),
        )
    };

    let args = match backend {
        PackageBackend::Pkgng => {
            let format = field.query_format().ok_or_else(unsupported)?;
            shell::join(["env", "PKG_PATH=", PKG_COMMAND, "query", format, pkg])
        }
        PackageBackend::Legacy => {
            let flag = field.legacy_flag().ok_or_else(unsupported)?;
            let flag = format!("-q{}", flag);
            shell::join(["env", "PKG_PATH=", PKG_INFO_COMMAND, flag.as_str(), pkg])
        }
    };

    let chdir = match pkg.rsplit_once('/') {
        Some((dir, _)) => {
            let dir = if dir.is_empty() { "/" } else { dir };
            format!("cd {}; ", shell::quote(dir))
        }
        None => String::new(),
    };

    Ok(format!("{}{} 2>/dev/null", chdir, args))
}

/// Normalize the raw output of an info command.
///
/// Trailing newlines are removed; empty output means the information is
/// not available.
pub fn parse_info_output(output: &str) -> Option<String> {
    let trimmed = output.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn repeated_slashes() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"//+").expect("valid regex"))
}

/// Split a file listing into paths, collapsing repeated slashes.
///
/// ```
/// use pkgtools::package::parse_file_list;
///
/// let files = parse_file_list("/usr/local//bin/curl\n/usr/local/lib///libcurl.so\n");
/// assert_eq!(files, ["/usr/local/bin/curl", "/usr/local/lib/libcurl.so"]);
/// ```
pub fn parse_file_list(output: &str) -> Vec<String> {
    repeated_slashes()
        .replace_all(output, "/")
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn plist_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^@name\s+(\S+)\s*$").expect("valid regex"))
}

/// Extract the package identifier from a packing list.
///
/// Package files record their identity in an `@name <pkgname>` line.
///
/// # Errors
///
/// Fails if no `@name` line is present or its value is not an identifier.
pub fn parse_plist_name(plist: &str) -> PkgResult<PackageIdentifier> {
    let captures = plist_name_pattern()
        .captures(plist)
        .ok_or_else(|| PkgError::format("packing list", "couldn't get package name"))?;

    PackageIdentifier::parse(&captures[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_table_is_consistent() {
        for field in InfoField::ALL {
            assert_eq!(field.name().parse::<InfoField>().unwrap(), field);
            assert!(
                field.legacy_flag().is_some() || field.query_format().is_some(),
                "{} has no source",
                field
            );
        }
    }

    #[test]
    fn test_unknown_field() {
        assert!("size".parse::<InfoField>().is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("pkgng".parse::<PackageBackend>().unwrap(), PackageBackend::Pkgng);
        assert_eq!("PKG".parse::<PackageBackend>().unwrap(), PackageBackend::Pkgng);
        assert_eq!("legacy".parse::<PackageBackend>().unwrap(), PackageBackend::Legacy);
        assert!("rpm".parse::<PackageBackend>().is_err());
    }

    #[test]
    fn test_info_command_pkgng_quotes_format() {
        let cmd = info_command(PackageBackend::Pkgng, "foo-1.0", InfoField::Mtime).unwrap();
        assert_eq!(cmd, "env PKG_PATH= /usr/sbin/pkg query %t foo-1.0 2>/dev/null");
    }

    #[test]
    fn test_info_command_for_package_file() {
        let cmd = info_command(
            PackageBackend::Legacy,
            "/var/cache/pkg/All/foo-1.0.tbz",
            InfoField::Plist,
        )
        .unwrap();
        assert_eq!(
            cmd,
            "cd /var/cache/pkg/All; env PKG_PATH= /usr/sbin/pkg_info -qf /var/cache/pkg/All/foo-1.0.tbz 2>/dev/null"
        );
    }

    #[test]
    fn test_info_command_quotes_unusual_paths() {
        let cmd = info_command(PackageBackend::Pkgng, "/tmp/my pkgs/foo-1.0.pkg", InfoField::Origin)
            .unwrap();
        assert!(cmd.starts_with("cd \"/tmp/my pkgs\"; "));
        assert!(cmd.contains("\"/tmp/my pkgs/foo-1.0.pkg\""));
    }

    #[test]
    fn test_info_command_unsupported() {
        let err = info_command(PackageBackend::Pkgng, "foo-1.0", InfoField::Descr).unwrap_err();
        assert!(err.to_string().contains("pkgng"));
        assert!(info_command(PackageBackend::Legacy, "foo-1.0", InfoField::Mtime).is_err());
    }

    #[test]
    fn test_parse_info_output() {
        assert_eq!(parse_info_output("misc/foo\n"), Some("misc/foo".to_string()));
        assert_eq!(parse_info_output("\n"), None);
        assert_eq!(parse_info_output(""), None);
    }

    #[test]
    fn test_parse_plist_name() {
        let plist = "@comment PKG_FORMAT_REVISION:1.1\n@name foo-bar-1.2_3\n@cwd /usr/local\nbin/foo\n";
        let pkg = parse_plist_name(plist).unwrap();
        assert_eq!(pkg.name(), "foo-bar");
        assert_eq!(pkg.version().as_str(), "1.2_3");
    }

    #[test]
    fn test_parse_plist_name_missing() {
        assert!(parse_plist_name("@cwd /usr/local\nbin/foo\n").is_err());
    }
}
