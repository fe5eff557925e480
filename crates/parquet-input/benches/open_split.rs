//! Open-and-drain benchmarks for both execution modes

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use config::JobConf;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use parquet_input::{
    FileSplit, NullReporter, ReadSupport, Record, RecordReader, SplitReaderFactory,
};

const ROWS: usize = 100_000;

fn write_data(path: &Path) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("score", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(0..ROWS as i64)),
            Arc::new(StringArray::from_iter_values(
                (0..ROWS).map(|i| format!("name-{}", i % 1000)),
            )),
            Arc::new(Float64Array::from_iter_values(
                (0..ROWS).map(|i| i as f64 * 0.5),
            )),
        ],
    )
    .expect("Failed to build batch");

    let file = File::create(path).expect("Failed to create file");
    let props = WriterProperties::builder()
        .set_max_row_group_size(ROWS / 4)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn benchmark_read_split(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("bench.parquet");
    write_data(&path);

    let file_len = std::fs::metadata(&path).expect("Failed to stat file").len();
    let split = FileSplit::new(&path, 0, file_len);
    let factory = SplitReaderFactory::new(ReadSupport::new());

    let mut group = c.benchmark_group("read_split");
    for vectorized in [true, false] {
        let job = JobConf::builder()
            .set(config::VECTORIZATION_ENABLED, vectorized)
            .build()
            .expect("Failed to build JobConf");
        let mode = if vectorized { "vectorized" } else { "row-mode" };

        group.bench_with_input(BenchmarkId::from_parameter(mode), &job, |b, job| {
            b.iter(|| {
                let mut reader = factory
                    .open(black_box(&split), job, NullReporter::shared())
                    .expect("Failed to open split");
                let mut rows = 0;
                while let Some(record) = reader.next_value().expect("Failed to read") {
                    rows += match record {
                        Record::Batch(batch) => batch.num_rows(),
                        Record::Row(_) => 1,
                    };
                }
                black_box(rows)
            });
        });
    }
    group.finish();
}

fn benchmark_open_only(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("bench.parquet");
    write_data(&path);

    let file_len = std::fs::metadata(&path).expect("Failed to stat file").len();
    let split = FileSplit::new(&path, 0, file_len);
    let factory = SplitReaderFactory::new(ReadSupport::new().add_column("id"));
    let job = JobConf::builder()
        .set(config::VECTORIZATION_ENABLED, true)
        .build()
        .expect("Failed to build JobConf");

    c.bench_function("open_split_vectorized", |b| {
        b.iter(|| {
            let reader = factory
                .open(black_box(&split), &job, NullReporter::shared())
                .expect("Failed to open split");
            black_box(reader)
        });
    });
}

criterion_group!(benches, benchmark_read_split, benchmark_open_only);
criterion_main!(benches);
