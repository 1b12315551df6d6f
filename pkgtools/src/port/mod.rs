//! Ports INDEX records.
//!
//! Each line of a ports `INDEX` file describes one port in 13 `|`-separated
//! fields:
//!
//! ```text
//! pkgname|origin|prefix|comment|descr_file|maintainer|categories|
//! build_depends|run_depends|www|extract_depends|patch_depends|fetch_depends
//! ```
//!
//! `origin` and `descr_file` are absolute paths inside the ports tree;
//! list fields are space separated. The layout is shared with the ports
//! tree's `make index` output and must be reproduced exactly.

mod field;
mod index;
mod record;

pub use field::{FieldKind, PortField, FIELD_SEPARATOR, NFIELDS};
pub use index::PortIndex;
pub use record::PortRecord;
