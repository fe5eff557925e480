//! Record readers for splits, and the factories that build them
//!
//! Two execution modes share one iteration contract:
//! - [`BatchReader`]: vectorized, yields arrow `RecordBatch`es
//! - [`RowReader`]: row-wise, yields one `parquet::record::Row` at a time
//!
//! The key slot of the engine's key/value contract is always `()`, so readers
//! only produce values.

pub mod row;
pub mod vectorized;

pub use row::{RowReader, RowReaderFactory};
pub use vectorized::{BatchReader, VectorizedReaderFactory};

use std::fmt;
use std::fs::File;
use std::sync::Arc;

use config::JobConf;

use crate::error::{CreateError, Interrupted, Result};
use crate::reporter::Reporter;
use crate::split::FileSplit;

/// How records of a split are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Batches of column vectors
    Vectorized,
    /// One materialized record at a time
    RowWise,
}

impl ExecutionMode {
    /// Reads the vectorization flag once; absent or invalid means row-wise
    pub fn from_conf(job: &JobConf) -> Self {
        if job.is_vector_mode() {
            ExecutionMode::Vectorized
        } else {
            ExecutionMode::RowWise
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Vectorized => "vectorized",
            ExecutionMode::RowWise => "row-mode",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull-based reader over the records of one split
pub trait RecordReader {
    type Value;

    /// Returns the next value, or `None` once the split is exhausted
    fn next_value(&mut self) -> Result<Option<Self::Value>>;

    /// Rows consumed so far
    fn pos(&self) -> u64;

    /// Fraction of the split's rows consumed, in `[0.0, 1.0]`
    fn progress(&self) -> f32;
}

/// Builds a ready-to-iterate reader for a split
pub trait ReaderFactory: Send + Sync {
    type Reader: RecordReader;

    fn create_reader(
        &self,
        split: &FileSplit,
        job: &JobConf,
        reporter: Arc<dyn Reporter>,
    ) -> std::result::Result<Self::Reader, CreateError>;
}

/// A value produced by a [`ReaderHandle`]
#[derive(Debug, Clone, PartialEq)]
pub enum Record<B, R> {
    Batch(B),
    Row(R),
}

impl<B, R> Record<B, R> {
    pub fn as_batch(&self) -> Option<&B> {
        match self {
            Record::Batch(batch) => Some(batch),
            Record::Row(_) => None,
        }
    }

    pub fn as_row(&self) -> Option<&R> {
        match self {
            Record::Row(row) => Some(row),
            Record::Batch(_) => None,
        }
    }
}

/// Reader returned by [`SplitReaderFactory::open`](crate::SplitReaderFactory::open).
///
/// The variant is fixed when the split is opened.
#[derive(Debug)]
pub enum ReaderHandle<V = BatchReader, R = RowReader> {
    Vectorized(V),
    RowWise(R),
}

impl<V, R> ReaderHandle<V, R> {
    pub fn mode(&self) -> ExecutionMode {
        match self {
            ReaderHandle::Vectorized(_) => ExecutionMode::Vectorized,
            ReaderHandle::RowWise(_) => ExecutionMode::RowWise,
        }
    }
}

impl<V: RecordReader, R: RecordReader> RecordReader for ReaderHandle<V, R> {
    type Value = Record<V::Value, R::Value>;

    fn next_value(&mut self) -> Result<Option<Self::Value>> {
        match self {
            ReaderHandle::Vectorized(reader) => Ok(reader.next_value()?.map(Record::Batch)),
            ReaderHandle::RowWise(reader) => Ok(reader.next_value()?.map(Record::Row)),
        }
    }

    fn pos(&self) -> u64 {
        match self {
            ReaderHandle::Vectorized(reader) => reader.pos(),
            ReaderHandle::RowWise(reader) => reader.pos(),
        }
    }

    fn progress(&self) -> f32 {
        match self {
            ReaderHandle::Vectorized(reader) => reader.progress(),
            ReaderHandle::RowWise(reader) => reader.progress(),
        }
    }
}

impl<V: RecordReader, R: RecordReader> Iterator for ReaderHandle<V, R> {
    type Item = Result<Record<V::Value, R::Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

/// Returns `Interrupted` if the task was told to stop
pub(crate) fn checkpoint(reporter: &dyn Reporter, stage: &'static str) -> std::result::Result<(), Interrupted> {
    if reporter.is_interrupted() {
        return Err(Interrupted { stage });
    }
    Ok(())
}

/// Opens the split's file, checking the split against the file length
pub(crate) fn open_split_file(
    split: &FileSplit,
    reporter: &dyn Reporter,
) -> std::result::Result<File, CreateError> {
    checkpoint(reporter, "opening file")?;
    let file = File::open(split.path())?;
    let file_len = file.metadata()?.len();
    split.check_bounds(file_len)?;
    Ok(file)
}

/// Fraction of `total` consumed; an empty split is complete
pub(crate) fn fraction(consumed: u64, total: u64) -> f32 {
    if total == 0 {
        1.0
    } else {
        (consumed as f64 / total as f64).min(1.0) as f32
    }
}
