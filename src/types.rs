use crate::error::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Named collection of in-memory tables, iterated in insertion order.
pub type DatasetMap = IndexMap<String, DataFrame>;

/// Core trait that all ETL jobs must implement
#[async_trait::async_trait]
pub trait EtlJob: Send + Sync {
    /// Unique identifier for this job
    fn job_name(&self) -> &'static str;

    /// Fetch raw tables from the source, keyed by dataset name.
    ///
    /// `input_root` is the pipeline's input directory, for jobs that read
    /// local files; network-backed jobs may ignore it.
    async fn extract(&self, input_root: &Path) -> Result<DatasetMap>;

    /// Derive the output tables from the extracted input.
    ///
    /// Pure compute over in-memory tables; output keys become file names at
    /// load time, so they should carry the intended extension
    /// (e.g. `"sales.parquet"`).
    fn transform(&self, input: &DatasetMap) -> Result<DatasetMap>;
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub job_name: String,
    pub input_datasets: usize,
    pub output_datasets: usize,
    pub written: Vec<PathBuf>,
    pub finished_at: DateTime<Utc>,
    pub duration_secs: f64,
}
