//! File splits: byte ranges of a Parquet file assigned to one task
//!
//! A row group belongs to the split that contains its midpoint offset, so a
//! set of splits tiling a file hands every row group to exactly one reader.

use std::fmt;
use std::path::{Path, PathBuf};

use parquet::file::metadata::{ParquetMetaData, RowGroupMetaData};

use crate::error::{ReadError, Result};

/// Last split of a file may be this much larger than the split size
/// instead of leaving a tiny tail split.
const SPLIT_SLOP: f64 = 1.1;

/// A contiguous byte range of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSplit {
    path: PathBuf,
    start: u64,
    length: u64,
    hosts: Vec<String>,
}

impl FileSplit {
    pub fn new(path: impl Into<PathBuf>, start: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            start,
            length,
            hosts: Vec::new(),
        }
    }

    /// Attach locality hints for the scheduler
    pub fn with_hosts(mut self, hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Exclusive end offset
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Whether `offset` falls in `[start, end)`
    pub fn contains(&self, offset: i64) -> bool {
        offset >= 0 && (offset as u64) >= self.start && (offset as u64) < self.end()
    }

    /// Whether the row group is read by this split
    pub fn owns_row_group(&self, row_group: &RowGroupMetaData) -> bool {
        self.contains(row_group_midpoint(row_group))
    }

    /// Indices of the row groups read by this split
    pub fn select_row_groups(&self, metadata: &ParquetMetaData) -> Vec<usize> {
        metadata
            .row_groups()
            .iter()
            .enumerate()
            .filter(|(_, rg)| self.owns_row_group(rg))
            .map(|(i, _)| i)
            .collect()
    }

    /// Fails if the split starts past the end of a file of `file_len` bytes
    pub(crate) fn check_bounds(&self, file_len: u64) -> Result<()> {
        if self.start > file_len {
            return Err(ReadError::InvalidSplit(format!(
                "{} starts at {} but the file is {} bytes",
                self, self.start, file_len
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FileSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.path.display(), self.start, self.length)
    }
}

/// Midpoint offset of a row group's column data
pub fn row_group_midpoint(row_group: &RowGroupMetaData) -> i64 {
    if row_group.num_columns() == 0 {
        return 0;
    }

    let column = row_group.column(0);
    let mut offset = column.data_page_offset();
    if let Some(dictionary_offset) = column.dictionary_page_offset() {
        offset = offset.min(dictionary_offset);
    }

    offset + row_group.compressed_size() / 2
}

/// Tile a file into contiguous splits of at most `max_split_size` bytes.
///
/// An empty file yields one zero-length split.
pub fn plan_splits<P: AsRef<Path>>(path: P, max_split_size: u64) -> Result<Vec<FileSplit>> {
    if max_split_size == 0 {
        return Err(ReadError::InvalidConfig(
            "split size must be positive".to_string(),
        ));
    }

    let path = path.as_ref();
    let file_len = std::fs::metadata(path)?.len();

    let mut splits = Vec::new();
    let mut remaining = file_len;
    while remaining as f64 / max_split_size as f64 > SPLIT_SLOP {
        splits.push(FileSplit::new(path, file_len - remaining, max_split_size));
        remaining -= max_split_size;
    }
    if remaining > 0 || splits.is_empty() {
        splits.push(FileSplit::new(path, file_len - remaining, remaining));
    }

    Ok(splits)
}
