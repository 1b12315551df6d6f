//! Field layout of a ports INDEX line.

use std::fmt;

/// Separator between INDEX fields.
pub const FIELD_SEPARATOR: char = '|';

/// Number of fields on every INDEX line.
pub const NFIELDS: usize = PortField::ALL.len();

/// One column of a ports INDEX line, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortField {
    PkgName,
    Origin,
    Prefix,
    Comment,
    DescrFile,
    Maintainer,
    Categories,
    BuildDepends,
    RunDepends,
    Www,
    ExtractDepends,
    PatchDepends,
    FetchDepends,
}

/// How a field's text is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The `<name>-<version>` of the port's package.
    Identifier,
    /// A path below the ports tree root, stored relative to it.
    PortsPath,
    /// Free text; empty means absent.
    Text,
    /// Whitespace-separated words.
    List,
}

impl PortField {
    /// All fields in the order they appear on a line.
    pub const ALL: [PortField; 13] = [
        PortField::PkgName,
        PortField::Origin,
        PortField::Prefix,
        PortField::Comment,
        PortField::DescrFile,
        PortField::Maintainer,
        PortField::Categories,
        PortField::BuildDepends,
        PortField::RunDepends,
        PortField::Www,
        PortField::ExtractDepends,
        PortField::PatchDepends,
        PortField::FetchDepends,
    ];

    /// Column position, starting at 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decoding applied to this column.
    pub fn kind(self) -> FieldKind {
        match self {
            PortField::PkgName => FieldKind::Identifier,
            PortField::Origin | PortField::DescrFile => FieldKind::PortsPath,
            PortField::Prefix | PortField::Comment | PortField::Maintainer | PortField::Www => {
                FieldKind::Text
            }
            PortField::Categories
            | PortField::BuildDepends
            | PortField::RunDepends
            | PortField::ExtractDepends
            | PortField::PatchDepends
            | PortField::FetchDepends => FieldKind::List,
        }
    }

    /// Lowercase field name.
    pub fn name(self) -> &'static str {
        match self {
            PortField::PkgName => "pkgname",
            PortField::Origin => "origin",
            PortField::Prefix => "prefix",
            PortField::Comment => "comment",
            PortField::DescrFile => "descr_file",
            PortField::Maintainer => "maintainer",
            PortField::Categories => "categories",
            PortField::BuildDepends => "build_depends",
            PortField::RunDepends => "run_depends",
            PortField::Www => "www",
            PortField::ExtractDepends => "extract_depends",
            PortField::PatchDepends => "patch_depends",
            PortField::FetchDepends => "fetch_depends",
        }
    }
}

impl fmt::Display for PortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
