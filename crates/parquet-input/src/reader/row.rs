//! Row-wise reader: wraps parquet's native row iterator for a split

use std::fmt;
use std::sync::Arc;

use config::JobConf;
use parquet::file::metadata::RowGroupMetaData;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::serialized_reader::ReadOptionsBuilder;
use parquet::record::reader::RowIter;
use parquet::record::Row;
use tracing::debug;

use crate::error::{CreateError, Result};
use crate::read_support::ReadSupport;
use crate::reader::{checkpoint, fraction, open_split_file, ReaderFactory, RecordReader};
use crate::reporter::{Reporter, COUNTER_GROUP, ROWS_COUNTER};
use crate::split::FileSplit;

/// Rows between heartbeats
const PROGRESS_INTERVAL: u64 = 1024;

/// Builds [`RowReader`]s
#[derive(Debug, Clone)]
pub struct RowReaderFactory {
    read_support: Arc<ReadSupport>,
}

impl RowReaderFactory {
    pub fn new(read_support: Arc<ReadSupport>) -> Self {
        Self { read_support }
    }
}

impl ReaderFactory for RowReaderFactory {
    type Reader = RowReader;

    fn create_reader(
        &self,
        split: &FileSplit,
        _job: &JobConf,
        reporter: Arc<dyn Reporter>,
    ) -> std::result::Result<RowReader, CreateError> {
        let file = open_split_file(split, reporter.as_ref())?;

        checkpoint(reporter.as_ref(), "reading footer")?;
        let owner = split.clone();
        let options = ReadOptionsBuilder::new()
            .with_predicate(Box::new(move |row_group: &RowGroupMetaData, _: usize| {
                owner.owns_row_group(row_group)
            }))
            .build();
        let file_reader = SerializedFileReader::new_with_options(file, options)?;

        checkpoint(reporter.as_ref(), "building reader")?;
        let metadata = file_reader.metadata();
        let total_rows: u64 = metadata
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows().max(0) as u64)
            .sum();
        let row_groups = metadata.num_row_groups();
        let projection = self
            .read_support
            .projected_schema(metadata.file_metadata().schema_descr())?;

        debug!(
            split = %split,
            hosts = ?split.hosts(),
            row_groups = row_groups,
            rows = total_rows,
            "Built row-mode reader"
        );

        let rows = RowIter::from_file_into(Box::new(file_reader)).project(projection)?;

        Ok(RowReader {
            rows,
            reporter,
            rows_read: 0,
            unreported: 0,
            total_rows,
        })
    }
}

/// Yields the split's rows one materialized record at a time
pub struct RowReader {
    rows: RowIter<'static>,
    reporter: Arc<dyn Reporter>,
    rows_read: u64,
    /// Rows not yet added to the reporter's counter
    unreported: u64,
    total_rows: u64,
}

impl RowReader {
    /// Rows in the row groups owned by the split
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    fn report(&mut self) {
        if self.unreported > 0 {
            self.reporter.progress();
            self.reporter
                .incr_counter(COUNTER_GROUP, ROWS_COUNTER, self.unreported);
            self.unreported = 0;
        }
    }
}

impl RecordReader for RowReader {
    type Value = Row;

    fn next_value(&mut self) -> Result<Option<Row>> {
        let Some(row) = self.rows.next().transpose()? else {
            self.report();
            return Ok(None);
        };

        self.rows_read += 1;
        self.unreported += 1;
        if self.unreported >= PROGRESS_INTERVAL {
            self.report();
        }

        Ok(Some(row))
    }

    fn pos(&self) -> u64 {
        self.rows_read
    }

    fn progress(&self) -> f32 {
        fraction(self.rows_read, self.total_rows)
    }
}

impl Drop for RowReader {
    fn drop(&mut self) {
        self.report();
    }
}

impl fmt::Debug for RowReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowReader")
            .field("rows_read", &self.rows_read)
            .field("total_rows", &self.total_rows)
            .finish_non_exhaustive()
    }
}
