//! # parquet-input
//!
//! Reads the splits of Parquet files for a split-oriented batch engine.
//!
//! For every split the [`SplitReaderFactory`] decides, from the job
//! configuration, whether records are produced vectorized (arrow record
//! batches) or row-wise (one `parquet::record::Row` at a time), and returns a
//! ready-to-iterate [`ReaderHandle`].
//!
//! - A row group belongs to the split containing its midpoint, so splits that
//!   tile a file read every row exactly once
//! - Column projection and batch size come from a shared [`ReadSupport`]
//! - Interruption during reader setup is reported as a fatal
//!   [`OpenError::ReaderConstruction`], never as an I/O error
//!
//! ## Example
//!
//! ```no_run
//! use config::JobConf;
//! use parquet_input::{plan_splits, NullReporter, ReadSupport, RecordReader, SplitReaderFactory};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let job = JobConf::load(None)?;
//! let factory = SplitReaderFactory::new(ReadSupport::new().with_batch_size(4096));
//!
//! for split in plan_splits("data.parquet", job.split_max_size())? {
//!     let mut reader = factory.open(&split, &job, NullReporter::shared())?;
//!     while reader.next_value()?.is_some() {}
//!     println!("{}: {} rows", split, reader.pos());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod read_support;
pub mod reader;
pub mod reporter;
pub mod split;

pub use error::{CreateError, Interrupted, OpenError, ReadError, Result};
pub use factory::SplitReaderFactory;
pub use read_support::{ReadSupport, DEFAULT_BATCH_SIZE};
pub use reader::{
    BatchReader, ExecutionMode, ReaderFactory, ReaderHandle, Record, RecordReader, RowReader,
    RowReaderFactory, VectorizedReaderFactory,
};
pub use reporter::{NullReporter, Reporter, TaskReporter};
pub use split::{plan_splits, FileSplit};
