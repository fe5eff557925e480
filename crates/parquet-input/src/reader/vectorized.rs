//! Vectorized reader: arrow record batches over the row groups of a split

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use config::JobConf;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReader,
    ParquetRecordBatchReaderBuilder,
};
use parquet::file::metadata::ParquetMetaDataReader;
use tracing::debug;

use crate::error::{CreateError, Result};
use crate::read_support::ReadSupport;
use crate::reader::{checkpoint, fraction, open_split_file, ReaderFactory, RecordReader};
use crate::reporter::{Reporter, BATCHES_COUNTER, COUNTER_GROUP};
use crate::split::FileSplit;

/// Builds [`BatchReader`]s
#[derive(Debug, Clone)]
pub struct VectorizedReaderFactory {
    read_support: Arc<ReadSupport>,
}

impl VectorizedReaderFactory {
    pub fn new(read_support: Arc<ReadSupport>) -> Self {
        Self { read_support }
    }
}

impl ReaderFactory for VectorizedReaderFactory {
    type Reader = BatchReader;

    fn create_reader(
        &self,
        split: &FileSplit,
        _job: &JobConf,
        reporter: Arc<dyn Reporter>,
    ) -> std::result::Result<BatchReader, CreateError> {
        let file = open_split_file(split, reporter.as_ref())?;

        checkpoint(reporter.as_ref(), "reading footer")?;
        let metadata = ParquetMetaDataReader::new().parse_and_finish(&file)?;

        checkpoint(reporter.as_ref(), "building reader")?;
        let row_groups = split.select_row_groups(&metadata);
        let total_rows: u64 = row_groups
            .iter()
            .map(|&idx| metadata.row_group(idx).num_rows().max(0) as u64)
            .sum();

        let arrow_metadata =
            ArrowReaderMetadata::try_new(Arc::new(metadata), ArrowReaderOptions::new())?;
        let builder = ParquetRecordBatchReaderBuilder::new_with_metadata(file, arrow_metadata);
        let projection = self.read_support.projection_mask(builder.parquet_schema())?;

        debug!(
            split = %split,
            hosts = ?split.hosts(),
            row_groups = row_groups.len(),
            rows = total_rows,
            batch_size = self.read_support.batch_size(),
            "Built vectorized reader"
        );

        let inner = builder
            .with_row_groups(row_groups)
            .with_projection(projection)
            .with_batch_size(self.read_support.batch_size())
            .build()?;

        Ok(BatchReader {
            inner,
            reporter,
            rows_read: 0,
            total_rows,
        })
    }
}

/// Yields the split's rows as arrow record batches
pub struct BatchReader {
    inner: ParquetRecordBatchReader,
    reporter: Arc<dyn Reporter>,
    rows_read: u64,
    total_rows: u64,
}

impl BatchReader {
    /// Arrow schema of the produced batches, after projection
    pub fn schema(&self) -> SchemaRef {
        self.inner.schema()
    }

    /// Rows in the row groups owned by the split
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }
}

impl RecordReader for BatchReader {
    type Value = RecordBatch;

    fn next_value(&mut self) -> Result<Option<RecordBatch>> {
        let Some(batch) = self.inner.next().transpose()? else {
            return Ok(None);
        };

        self.rows_read += batch.num_rows() as u64;
        self.reporter.progress();
        self.reporter.incr_counter(COUNTER_GROUP, BATCHES_COUNTER, 1);

        Ok(Some(batch))
    }

    fn pos(&self) -> u64 {
        self.rows_read
    }

    fn progress(&self) -> f32 {
        fraction(self.rows_read, self.total_rows)
    }
}

impl fmt::Debug for BatchReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchReader")
            .field("rows_read", &self.rows_read)
            .field("total_rows", &self.total_rows)
            .finish_non_exhaustive()
    }
}
