//! `compare`: order two package identifiers or versions.

use std::cmp::Ordering;
use std::io::Write;

use clap::Args;
use pkgtools::package::PackageIdentifier;
use pkgtools::version::PkgVersion;

use super::emit;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Left operand: `<name>-<version>` or a bare version
    pub left: String,
    /// Right operand: `<name>-<version>` or a bare version
    pub right: String,
}

/// Order `left` against `right`.
///
/// With a `-` the left side is an identifier and the right side may be an
/// identifier or a version; otherwise both sides are versions.
pub fn compare(left: &str, right: &str) -> Result<Ordering, CliError> {
    let ordering = if left.contains('-') {
        PackageIdentifier::parse(left)?.compare(right)?
    } else {
        PkgVersion::parse(left)?.cmp(&PkgVersion::parse(right)?)
    };
    Ok(ordering)
}

/// Print `<`, `=` or `>`.
pub fn run(args: &CompareArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let symbol = match compare(&args.left, &args.right)? {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    emit(out, symbol)
}
