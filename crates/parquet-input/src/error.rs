//! Error types for split reader construction and iteration

use thiserror::Error;

/// Result type for reading operations
pub type Result<T> = std::result::Result<T, ReadError>;

/// Errors raised while opening or reading the data of a split.
///
/// This is the I/O category of failures: the caller decides whether to retry
/// the task.
#[derive(Error, Debug)]
pub enum ReadError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading or parsing the Parquet file
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error with Arrow data structures
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Projected column is not in the file schema
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Split does not describe a valid range of its file
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Decoding configuration cannot be applied
    #[error("Invalid read configuration: {0}")]
    InvalidConfig(String),
}

/// The task was signalled to stop while reader construction was blocked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("interrupted while {stage}")]
pub struct Interrupted {
    /// Construction stage that observed the interruption
    pub stage: &'static str,
}

/// Failure of a delegate reader factory
#[derive(Error, Debug)]
pub enum CreateError {
    #[error(transparent)]
    Io(#[from] ReadError),

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl From<std::io::Error> for CreateError {
    fn from(err: std::io::Error) -> Self {
        CreateError::Io(err.into())
    }
}

impl From<parquet::errors::ParquetError> for CreateError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        CreateError::Io(err.into())
    }
}

impl From<arrow::error::ArrowError> for CreateError {
    fn from(err: arrow::error::ArrowError) -> Self {
        CreateError::Io(err.into())
    }
}

/// Failure of [`SplitReaderFactory::open`](crate::SplitReaderFactory::open)
#[derive(Error, Debug)]
pub enum OpenError {
    /// Reader setup failed; the delegate's error is passed through as is
    #[error(transparent)]
    Io(ReadError),

    /// Construction was interrupted. Fatal for the task, never retried.
    #[error("Cannot create a record reader for {split}")]
    ReaderConstruction {
        split: String,
        #[source]
        source: Interrupted,
    },
}

impl OpenError {
    /// Whether the engine may retry the task that saw this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, OpenError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_create_error_from_io() {
        let err: CreateError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CreateError::Io(ReadError::Io(_))));
    }

    #[test]
    fn test_reader_construction_keeps_cause() {
        let err = OpenError::ReaderConstruction {
            split: "a.parquet:0+10".to_string(),
            source: Interrupted {
                stage: "opening file",
            },
        };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Cannot create a record reader for a.parquet:0+10");
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("interrupted while opening file".to_string())
        );
    }

    #[test]
    fn test_io_is_retryable() {
        let err = OpenError::Io(ReadError::InvalidSplit("bad".into()));
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Invalid split: bad");
    }
}
