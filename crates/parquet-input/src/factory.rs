//! Split reader factory: picks the execution mode for a split and builds its reader

use std::sync::Arc;

use config::JobConf;
use tracing::{debug, warn, Dispatch};

use crate::error::{CreateError, OpenError};
use crate::read_support::ReadSupport;
use crate::reader::{
    ExecutionMode, ReaderFactory, ReaderHandle, RowReaderFactory, VectorizedReaderFactory,
};
use crate::reporter::Reporter;
use crate::split::FileSplit;

/// Builds a reader for each split of a job.
///
/// Holds one pre-built factory per execution mode. Nothing is mutated after
/// construction, so a single factory can serve concurrent `open` calls.
///
/// # Example
///
/// ```no_run
/// use config::JobConf;
/// use parquet_input::{FileSplit, NullReporter, ReadSupport, SplitReaderFactory};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let factory = SplitReaderFactory::new(ReadSupport::new().add_column("id"));
/// let job = JobConf::load(None)?;
///
/// let split = FileSplit::new("data.parquet", 0, 1024);
/// let reader = factory.open(&split, &job, NullReporter::shared())?;
/// println!("Opened {} in {} mode", split, reader.mode());
///
/// for record in reader {
///     let record = record?;
///     println!("{:?}", record);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SplitReaderFactory<V = VectorizedReaderFactory, R = RowReaderFactory> {
    vectorized: V,
    row_wise: R,
    /// Receives the factory's diagnostics instead of the ambient subscriber
    dispatch: Option<Dispatch>,
}

impl SplitReaderFactory {
    /// Creates a factory whose two readers share one decoding configuration.
    ///
    /// No split or file is touched.
    pub fn new(read_support: ReadSupport) -> Self {
        let read_support = Arc::new(read_support);
        Self::with_factories(
            VectorizedReaderFactory::new(Arc::clone(&read_support)),
            RowReaderFactory::new(read_support),
        )
    }
}

impl<V: ReaderFactory, R: ReaderFactory> SplitReaderFactory<V, R> {
    /// Creates a factory from pre-built per-mode factories
    pub fn with_factories(vectorized: V, row_wise: R) -> Self {
        Self {
            vectorized,
            row_wise,
            dispatch: None,
        }
    }

    /// The vectorized and row-wise factories, in that order
    pub fn factories(&self) -> (&V, &R) {
        (&self.vectorized, &self.row_wise)
    }

    /// Sends the factory's trace events to `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Opens `split`, in vectorized mode if `job` asks for it and row-wise otherwise.
    ///
    /// The mode is read from `job` once per call. Reader setup failures are
    /// returned unchanged as [`OpenError::Io`]; an interruption during setup
    /// becomes [`OpenError::ReaderConstruction`].
    pub fn open(
        &self,
        split: &FileSplit,
        job: &JobConf,
        reporter: Arc<dyn Reporter>,
    ) -> Result<ReaderHandle<V::Reader, R::Reader>, OpenError> {
        let mode = ExecutionMode::from_conf(job);
        self.trace(|| debug!(mode = %mode, split = %split, "Using {} record reader", mode));

        let created = match mode {
            ExecutionMode::Vectorized => self
                .vectorized
                .create_reader(split, job, reporter)
                .map(ReaderHandle::Vectorized),
            ExecutionMode::RowWise => self
                .row_wise
                .create_reader(split, job, reporter)
                .map(ReaderHandle::RowWise),
        };

        created.map_err(|err| self.translate(split, err))
    }

    /// Maps a delegate failure onto the caller's error contract
    fn translate(&self, split: &FileSplit, err: CreateError) -> OpenError {
        match err {
            CreateError::Io(err) => OpenError::Io(err),
            CreateError::Interrupted(source) => {
                self.trace(|| warn!(split = %split, error = %source, "Reader construction interrupted"));
                OpenError::ReaderConstruction {
                    split: split.to_string(),
                    source,
                }
            }
        }
    }

    fn trace(&self, emit: impl FnOnce()) {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, emit),
            None => emit(),
        }
    }
}
