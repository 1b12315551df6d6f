//! Port version strings.
//!
//! FreeBSD port versions have the shape `<main>[_<revision>][,<epoch>]`,
//! e.g. `3.2.1_2,1`. The identifier and query code only needs them to be
//! totally ordered; [`PkgVersion`] provides that order.
//!
//! Ordering rules:
//!
//! 1. The epoch (after `,`) wins over everything else.
//! 2. The main part is split into numeric and alphabetic pieces at `.`, `+`
//!    and digit/letter boundaries, and compared piece by piece. Numbers
//!    compare numerically. Pre-release words (`alpha`, `beta`, `pre`, `rc`)
//!    sort before the release they precede, `pl` sorts after it, and other
//!    letters are treated as patch-level suffixes (`1.0a > 1.0`).
//! 3. The port revision (after `_`) breaks remaining ties.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{PkgError, PkgResult};

/// One comparable piece of the main version part.
///
/// Variant order is the sort order; `Missing` pads the shorter version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Piece {
    PreRelease(String),
    Missing,
    Letters(String),
    PatchLevel,
    /// Decimal digits with leading zeros stripped.
    Number(Digits),
}

/// Arbitrary-length unsigned decimal, ordered numerically.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Digits(String);

impl Digits {
    fn new(raw: &str) -> Self {
        let trimmed = raw.trim_start_matches('0');
        Self(trimmed.to_string())
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const PRE_RELEASE_WORDS: &[&str] = &["alpha", "beta", "pre", "rc"];

fn letters_piece(word: &str) -> Piece {
    let lower = word.to_ascii_lowercase();
    if lower == "pl" {
        Piece::PatchLevel
    } else if PRE_RELEASE_WORDS.contains(&lower.as_str()) {
        Piece::PreRelease(lower)
    } else {
        Piece::Letters(lower)
    }
}

fn split_pieces(main: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = main;

    while let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() {
            let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            pieces.push(Piece::Number(Digits::new(&rest[..end])));
            rest = &rest[end..];
        } else if c.is_alphabetic() {
            let end = rest.find(|c: char| !c.is_alphabetic()).unwrap_or(rest.len());
            pieces.push(letters_piece(&rest[..end]));
            rest = &rest[end..];
        } else {
            rest = &rest[c.len_utf8()..];
        }
    }

    pieces
}

/// A parsed port version.
///
/// Equality follows the ordering, so `1.0` and `1.00` are equal even though
/// they print differently.
///
/// ```
/// use pkgtools::version::PkgVersion;
///
/// let a: PkgVersion = "1.9_1".parse().unwrap();
/// let b: PkgVersion = "1.10".parse().unwrap();
/// assert!(a < b);
/// assert!(b < "0.1,1".parse().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct PkgVersion {
    raw: String,
    pieces: Vec<Piece>,
    revision: u64,
    epoch: u64,
}

impl PkgVersion {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Fails on empty input, whitespace, an embedded `-`, or a non-numeric
    /// epoch.
    pub fn parse(s: &str) -> PkgResult<Self> {
        if s.is_empty() {
            return Err(PkgError::format(s, "empty version"));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(PkgError::format(s, "contains whitespace"));
        }
        if s.contains('-') {
            return Err(PkgError::format(s, "version must not contain '-'"));
        }

        let (rest, epoch) = match s.rsplit_once(',') {
            Some((rest, epoch)) => {
                let epoch = epoch
                    .parse()
                    .map_err(|_| PkgError::format(s, "invalid epoch"))?;
                (rest, epoch)
            }
            None => (s, 0),
        };

        let (main, revision) = match rest.rsplit_once('_') {
            Some((main, rev)) if !rev.is_empty() && rev.bytes().all(|b| b.is_ascii_digit()) => {
                (main, rev.parse().unwrap_or(u64::MAX))
            }
            _ => (rest, 0),
        };

        Ok(Self {
            raw: s.to_string(),
            pieces: split_pieces(main),
            revision,
            epoch,
        })
    }

    /// The version exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Port epoch (`,N` suffix), 0 when absent.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Port revision (`_N` suffix), 0 when absent.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn cmp_pieces(&self, other: &Self) -> Ordering {
        let len = self.pieces.len().max(other.pieces.len());
        (0..len)
            .map(|i| {
                let a = self.pieces.get(i).unwrap_or(&Piece::Missing);
                let b = other.pieces.get(i).unwrap_or(&Piece::Missing);
                a.cmp(b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl Ord for PkgVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.cmp_pieces(other))
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

impl PartialOrd for PkgVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PkgVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PkgVersion {}

impl FromStr for PkgVersion {
    type Err = PkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> PkgVersion {
        PkgVersion::parse(s).unwrap()
    }

    #[test]
    fn test_numeric_components() {
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("2.0") > v("1.99.99"));
        assert_eq!(v("1.0"), v("1.00"));
    }

    #[test]
    fn test_revision_and_epoch() {
        assert!(v("1.0") < v("1.0_1"));
        assert!(v("1.0_1") < v("1.0_10"));
        assert!(v("1.0_9") < v("1.0.1"));
        assert!(v("9.9_9") < v("0.1,1"));
        assert_eq!(v("1.0_1").revision(), 1);
        assert_eq!(v("1.0_1,2").epoch(), 2);
    }

    #[test]
    fn test_letters() {
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0alpha2") < v("1.0beta1"));
        assert!(v("1.0beta1") < v("1.0rc1"));
        assert!(v("1.0") < v("1.0pl1"));
        assert!(v("1.0.2") < v("1.0.2k"));
        assert!(v("1.0.2j") < v("1.0.2k"));
    }

    #[test]
    fn test_huge_numbers() {
        assert!(v("20240101000000000000000") < v("20240101000000000000001"));
    }

    #[test]
    fn test_display_preserves_input() {
        assert_eq!(v("1.00_1,2").to_string(), "1.00_1,2");
    }

    #[test]
    fn test_parse_errors() {
        assert!(PkgVersion::parse("").is_err());
        assert!(PkgVersion::parse("1 0").is_err());
        assert!(PkgVersion::parse("1-0").is_err());
        assert!(PkgVersion::parse("1.0,x").is_err());
    }
}
