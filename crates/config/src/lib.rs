use anyhow::{Context, Result};
use config_rs::{Config as ConfigBuilder, Environment, File, Value};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::debug;

/// Key of the flag that requests vectorized (batch) execution for a job
pub const VECTORIZATION_ENABLED: &str = "vectorized.execution.enabled";

/// Key of the upper bound, in bytes, for splits planned over one file
pub const SPLIT_MAX_SIZE: &str = "split.maxsize";

/// Default split size: 128 MiB
pub const DEFAULT_SPLIT_MAX_SIZE: u64 = 128 * 1024 * 1024;

/// Prefix for environment overrides (e.g. `PARQUET_INPUT_VECTORIZED_EXECUTION_ENABLED=true`)
pub const ENV_PREFIX: &str = "PARQUET_INPUT";

/// Read-only key/value configuration scoped to one job.
///
/// A `JobConf` is built once, before any split is processed, and is never
/// mutated afterwards. Values are layered with the following priority:
/// 1. Default values
/// 2. TOML file (if provided)
/// 3. Environment variables (`PARQUET_INPUT_*` prefix, if enabled)
/// 4. Explicit overrides set on the builder
#[derive(Debug, Clone)]
pub struct JobConf {
    inner: config_rs::Config,
}

/// Builder for [`JobConf`]
#[derive(Debug, Default)]
pub struct JobConfBuilder {
    config_file: Option<PathBuf>,
    use_env: bool,
    overrides: Vec<(String, Value)>,
}

impl JobConfBuilder {
    /// Layer a TOML file over the defaults
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Layer `PARQUET_INPUT_*` environment variables over the file
    pub fn env(mut self) -> Self {
        self.use_env = true;
        self
    }

    /// Set an explicit value; overrides always win
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<JobConf> {
        let mut builder = ConfigBuilder::builder()
            .set_default(VECTORIZATION_ENABLED, false)?
            .set_default(SPLIT_MAX_SIZE, DEFAULT_SPLIT_MAX_SIZE as i64)?;

        if let Some(path) = &self.config_file {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path.as_path()));
        }

        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("_")
                    .try_parsing(true),
            );
        }

        for (key, value) in self.overrides {
            builder = builder
                .set_override(key.as_str(), value)
                .with_context(|| format!("Invalid override for {}", key))?;
        }

        let inner = builder.build().context("Failed to build job configuration")?;
        Ok(JobConf { inner })
    }
}

impl JobConf {
    pub fn builder() -> JobConfBuilder {
        JobConfBuilder::default()
    }

    /// Load a JobConf from defaults, an optional TOML file and the environment
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file_path) = config_file {
            builder = builder.file(file_path);
        }
        builder.build()
    }

    /// Whether vectorized execution is requested for this job.
    ///
    /// An absent or unparsable value means "disabled".
    pub fn is_vector_mode(&self) -> bool {
        self.get_bool(VECTORIZATION_ENABLED, false)
    }

    /// Maximum size of a planned split in bytes
    pub fn split_max_size(&self) -> u64 {
        self.get::<u64>(SPLIT_MAX_SIZE)
            .unwrap_or(DEFAULT_SPLIT_MAX_SIZE)
    }

    /// Read a boolean, falling back to `default` when the key is absent or invalid.
    ///
    /// Only `true` and `false` (any case) are valid; `1`, `on` or `yes` are not.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get_string(key) else {
            return default;
        };
        if raw.eq_ignore_ascii_case("true") {
            true
        } else if raw.eq_ignore_ascii_case("false") {
            false
        } else {
            debug!(key = key, value = %raw, default = default, "Using default for boolean setting");
            default
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.inner.get_string(key).ok()
    }

    /// Deserialize the value (or table) at `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.inner.get::<T>(key).ok()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let split_max_size = self
            .inner
            .get::<i64>(SPLIT_MAX_SIZE)
            .with_context(|| format!("{} must be an integer", SPLIT_MAX_SIZE))?;
        anyhow::ensure!(split_max_size > 0, "{} must be positive", SPLIT_MAX_SIZE);
        Ok(())
    }
}

impl Default for JobConf {
    fn default() -> Self {
        Self {
            inner: config_rs::Config::default(),
        }
    }
}
