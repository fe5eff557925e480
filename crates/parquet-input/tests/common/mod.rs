//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use config::JobConf;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use tempfile::TempDir;

/// A Parquet file of `rows` rows (`id` = 0.., `name` = "row-{id}")
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
    pub rows: usize,
}

impl Fixture {
    pub fn new(rows: usize, row_group_size: usize) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = write_parquet(dir.path(), "data.parquet", rows, row_group_size);
        Self {
            _dir: dir,
            path,
            rows,
        }
    }

    pub fn file_len(&self) -> u64 {
        std::fs::metadata(&self.path)
            .expect("Failed to stat fixture")
            .len()
    }
}

/// Writes an `id: Int64, name: Utf8` file with the given row group size
pub fn write_parquet(dir: &Path, name: &str, rows: usize, row_group_size: usize) -> PathBuf {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
    ]));

    let ids = Int64Array::from_iter_values(0..rows as i64);
    let names = StringArray::from_iter_values((0..rows).map(|i| format!("row-{}", i)));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(ids), Arc::new(names)])
        .expect("Failed to build batch");

    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create parquet file");
    let props = WriterProperties::builder()
        .set_max_row_group_size(row_group_size)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    path
}

/// JobConf with the vectorization flag set
pub fn job(vectorized: bool) -> JobConf {
    JobConf::builder()
        .set(config::VECTORIZATION_ENABLED, vectorized)
        .build()
        .expect("Failed to build JobConf")
}
