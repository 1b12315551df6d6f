//! Package identifiers and package information queries.
//!
//! # Overview
//!
//! - **PackageIdentifier**: a parsed `<name>-<version>` designation, ordered
//!   by name and then version
//! - **Operand**: the closed set of things an identifier can be compared with
//! - **InfoField**: the table of per-package information the package tools
//!   can report, and how to ask each backend for it
//!
//! # Comparison
//!
//! ```text
//! PackageIdentifier.compare(...)
//! ├── Identifier("bar-2.0")  → name, then version
//! ├── Version("2.0")         → version only
//! ├── Raw("bar-2.0")         → parsed as identifier
//! ├── Raw("2.0")             → parsed as version
//! └── Port(&PortRecord)      → UnsupportedComparison
//! ```

mod identifier;
mod info;

pub use identifier::{Operand, PackageIdentifier};
pub use info::{
    info_command, parse_file_list, parse_info_output, parse_plist_name, InfoField,
    PackageBackend, PKG_COMMAND, PKG_INFO_COMMAND,
};
