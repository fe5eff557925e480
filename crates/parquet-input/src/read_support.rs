//! Decoding configuration shared by both reader factories
//!
//! A [`ReadSupport`] names the top-level columns to read and the number of
//! rows per vectorized batch. It is resolved against each file's schema when
//! a reader is built.

use std::collections::BTreeSet;

use parquet::arrow::ProjectionMask;
use parquet::schema::types::{SchemaDescriptor, Type};

use crate::error::{ReadError, Result};

/// Rows per vectorized batch unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Schema projection and batching for reading a split
#[derive(Debug, Clone)]
pub struct ReadSupport {
    /// Top-level column names to read; `None` reads every column
    columns: Option<Vec<String>>,

    /// Rows per batch for vectorized readers
    batch_size: usize,
}

impl ReadSupport {
    /// Reads all columns with the default batch size
    pub fn new() -> Self {
        Self {
            columns: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Adds a column to the projection by name
    pub fn add_column(mut self, column_name: impl Into<String>) -> Self {
        self.columns
            .get_or_insert_with(Vec::new)
            .push(column_name.into());
        self
    }

    /// Adds multiple columns to the projection
    pub fn add_columns(mut self, column_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let columns = self.columns.get_or_insert_with(Vec::new);
        for name in column_names {
            columns.push(name.into());
        }
        self
    }

    /// Sets the rows per vectorized batch (at least one)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Returns the selected column names, or `None` when reading all columns
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Builds the arrow projection mask for a file
    pub fn projection_mask(&self, schema: &SchemaDescriptor) -> Result<ProjectionMask> {
        match self.root_indices(schema)? {
            None => Ok(ProjectionMask::all()),
            Some(indices) => Ok(ProjectionMask::roots(schema, indices)),
        }
    }

    /// Builds the projected message type for a row-wise reader
    ///
    /// Returns `None` when every column is read.
    pub fn projected_schema(&self, schema: &SchemaDescriptor) -> Result<Option<Type>> {
        let Some(indices) = self.root_indices(schema)? else {
            return Ok(None);
        };

        let root = schema.root_schema();
        let fields = root.get_fields();
        let projected = Type::group_type_builder(root.name())
            .with_fields(indices.into_iter().map(|i| fields[i].clone()).collect())
            .build()?;

        Ok(Some(projected))
    }

    /// Resolves the projected names to root field indices, in file order
    fn root_indices(&self, schema: &SchemaDescriptor) -> Result<Option<Vec<usize>>> {
        let Some(columns) = &self.columns else {
            return Ok(None);
        };

        if columns.is_empty() {
            return Err(ReadError::InvalidConfig(
                "projection selects no columns".to_string(),
            ));
        }

        let fields = schema.root_schema().get_fields();
        let mut indices = BTreeSet::new();
        for name in columns {
            let idx = fields
                .iter()
                .position(|field| field.name() == name)
                .ok_or_else(|| ReadError::MissingColumn(name.clone()))?;
            indices.insert(idx);
        }

        Ok(Some(indices.into_iter().collect()))
    }
}

impl Default for ReadSupport {
    fn default() -> Self {
        Self::new()
    }
}
