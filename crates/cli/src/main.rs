use anyhow::{Context, Result};
use clap::Parser;
use config::{JobConf, VECTORIZATION_ENABLED};
use parquet_input::reporter::{BATCHES_COUNTER, COUNTER_GROUP};
use parquet_input::{
    plan_splits, ReadSupport, Record, RecordReader, Reporter, SplitReaderFactory, TaskReporter,
    DEFAULT_BATCH_SIZE,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Read a Parquet file split by split
#[derive(Parser, Debug)]
#[command(name = "parquet-input")]
#[command(about = "Read a Parquet file split by split", long_about = None)]
struct Args {
    /// Parquet file to read
    file: PathBuf,

    /// Path to TOML job configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Force vectorized (true) or row-wise (false) execution
    #[arg(long)]
    vectorized: Option<bool>,

    /// Maximum split size in bytes (defaults to split.maxsize from the job configuration)
    #[arg(long)]
    split_size: Option<u64>,

    /// Comma-separated top-level columns to read
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Rows per vectorized batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Print the first N records of each split
    #[arg(long, default_value_t = 0)]
    show: usize,
}

fn main() -> Result<()> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut builder = JobConf::builder().env();
    if let Some(file) = &args.config {
        builder = builder.file(file);
    }
    if let Some(vectorized) = args.vectorized {
        builder = builder.set(VECTORIZATION_ENABLED, vectorized);
    }
    let job = builder.build().context("Failed to load job configuration")?;
    job.validate().context("Invalid job configuration")?;

    let mut read_support = ReadSupport::new().with_batch_size(args.batch_size);
    if !args.columns.is_empty() {
        read_support = read_support.add_columns(args.columns.iter().cloned());
    }
    let factory = SplitReaderFactory::new(read_support);

    let split_size = args.split_size.unwrap_or_else(|| job.split_max_size());
    let splits = plan_splits(&args.file, split_size)
        .with_context(|| format!("Failed to plan splits for {}", args.file.display()))?;
    info!(
        file = %args.file.display(),
        splits = splits.len(),
        split_size = split_size,
        vectorized = job.is_vector_mode(),
        "Planned splits"
    );

    let mut total_rows = 0u64;
    for split in &splits {
        let reporter = Arc::new(TaskReporter::new());
        reporter.set_status(&format!("reading {}", split));

        let mut reader = match factory.open(split, &job, reporter.clone()) {
            Ok(reader) => reader,
            Err(e) if e.is_retryable() => {
                warn!(split = %split, error = %e, "Failed to open split");
                return Err(e).with_context(|| format!("Failed to open {}", split));
            }
            Err(e) => return Err(e).with_context(|| format!("Aborted {}", split)),
        };

        let mut shown = 0;
        while let Some(record) = reader
            .next_value()
            .with_context(|| format!("Failed to read {}", split))?
        {
            if shown < args.show {
                match &record {
                    Record::Batch(batch) => {
                        println!("{}: batch of {} rows", split, batch.num_rows())
                    }
                    Record::Row(row) => println!("{}: {}", split, row),
                }
                shown += 1;
            }
        }

        total_rows += reader.pos();
        println!(
            "{} [{}] rows={} batches={} progress={:.2}",
            split,
            reader.mode(),
            reader.pos(),
            reporter.counter(COUNTER_GROUP, BATCHES_COUNTER),
            reader.progress()
        );
    }

    println!("{} splits, {} rows", splits.len(), total_rows);
    Ok(())
}
