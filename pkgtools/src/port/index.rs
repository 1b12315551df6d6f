//! The ports INDEX file: one [`PortRecord`] per line.

use super::record::PortRecord;
use crate::error::{PkgError, PkgResult};
use crate::query::{PackageDatabase, QueryMatcher, QueryPattern};
use crate::search::qindex_by;

/// All ports of a tree, sorted by origin.
///
/// ```
/// use pkgtools::port::PortIndex;
///
/// let text = "\
/// vim-9.0|/usr/ports/editors/vim|/usr/local|Vi improved|/usr/ports/editors/vim/pkg-descr|a@b.org|editors||||||
/// curl-8.5.0|/usr/ports/ftp/curl|/usr/local|Transfer tool|/usr/ports/ftp/curl/pkg-descr|a@b.org|ftp||||||
/// ";
/// let index = PortIndex::parse(text).unwrap();
///
/// assert_eq!(index.len(), 2);
/// assert_eq!(index.get("ftp/curl").unwrap().pkgname().to_string(), "curl-8.5.0");
/// assert!(index.get("www/curl").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortIndex {
    records: Vec<PortRecord>,
}

impl PortIndex {
    /// Build an index from records. When several records share an origin,
    /// the first one is kept.
    pub fn from_records(mut records: Vec<PortRecord>) -> Self {
        records.sort();
        records.dedup();
        Self { records }
    }

    /// Parse INDEX text. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// The first malformed line, reported with its line number.
    pub fn parse(text: &str) -> PkgResult<Self> {
        let records = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                PortRecord::parse(line).map_err(|e| {
                    PkgError::format(format!("INDEX line {}", n + 1), e.to_string())
                })
            })
            .collect::<PkgResult<Vec<_>>>()?;

        tracing::debug!(ports = records.len(), "Parsed ports INDEX");

        Ok(Self::from_records(records))
    }

    /// Number of ports.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index has no ports.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a port by `category/name`.
    pub fn get(&self, origin: &str) -> Option<&PortRecord> {
        qindex_by(&self.records, |record| record.cmp_origin(origin)).map(|i| &self.records[i])
    }

    /// Ports in origin order.
    pub fn iter(&self) -> impl Iterator<Item = &PortRecord> {
        self.records.iter()
    }

    /// Ports matching `pattern` by origin or package name.
    pub fn select<D>(&self, pattern: &QueryPattern, matcher: &QueryMatcher<'_, D>) -> Vec<&PortRecord>
    where
        D: PackageDatabase + ?Sized,
    {
        self.records
            .iter()
            .filter(|record| record.matches(pattern, matcher))
            .collect()
    }

    /// Write the whole index for the tree at `ports_dir`.
    pub fn to_text(&self, ports_dir: &str) -> String {
        self.records
            .iter()
            .map(|record| record.to_line(ports_dir))
            .collect()
    }
}

impl<'a> IntoIterator for &'a PortIndex {
    type Item = &'a PortRecord;
    type IntoIter = std::slice::Iter<'a, PortRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
