use crate::error::{EtlError, Result};
use crate::store::TableStore;
use crate::types::{DatasetMap, EtlJob, PipelineResult};
use chrono::Utc;
use metrics::{counter, histogram};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Three-stage ETL driver owning the dataset caches and filesystem roots.
///
/// The job supplies the extract and transform semantics; the driver supplies
/// the skeleton shared by every job: lazy cache population, ordered load, and
/// the strict extract → transform → load run sequence. Each cache is `None`
/// until its first population, and `Some(empty map)` is a populated state,
/// not an unset one.
pub struct EtlPipeline {
    job: Box<dyn EtlJob>,
    store: Arc<dyn TableStore>,
    input_root: PathBuf,
    output_root: PathBuf,
    input_cache: Option<DatasetMap>,
    output_cache: Option<DatasetMap>,
}

impl EtlPipeline {
    /// Create a pipeline over the two filesystem roots.
    ///
    /// With `create_dirs` set, both roots are created recursively; creating
    /// an existing directory is not an error, so construction is safe to
    /// repeat. Both caches start unset.
    pub fn new(
        job: Box<dyn EtlJob>,
        store: Arc<dyn TableStore>,
        input_dir: &str,
        output_dir: &str,
        create_dirs: bool,
    ) -> Result<Self> {
        let input_root = PathBuf::from(input_dir);
        let output_root = PathBuf::from(output_dir);

        if create_dirs {
            ensure_dir(&input_root)?;
            ensure_dir(&output_root)?;
        }

        Ok(Self {
            job,
            store,
            input_root,
            output_root,
            input_cache: None,
            output_cache: None,
        })
    }

    pub fn job_name(&self) -> &'static str {
        self.job.job_name()
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Input datasets, extracting on first access.
    ///
    /// Later calls reuse the cache; re-running [`extract`](Self::extract) is
    /// the only way to refresh it.
    pub async fn input_data(&mut self) -> Result<&DatasetMap> {
        if self.input_cache.is_none() {
            self.extract().await?;
        }
        // extract always installs a map, so this never inserts
        Ok(self.input_cache.get_or_insert_with(DatasetMap::new))
    }

    /// Output datasets, running the extract → transform chain on first access.
    pub async fn output_data(&mut self) -> Result<&DatasetMap> {
        if self.output_cache.is_none() {
            self.transform().await?;
        }
        Ok(self.output_cache.get_or_insert_with(DatasetMap::new))
    }

    /// Force extraction, replacing the input cache.
    ///
    /// The output cache is left alone: transform decides what derives from
    /// the refreshed input.
    #[instrument(skip(self), fields(job = %self.job.job_name()))]
    pub async fn extract(&mut self) -> Result<()> {
        let t = Instant::now();
        let datasets = self.job.extract(&self.input_root).await?;
        histogram!("etl_extract_duration_seconds", "job" => self.job.job_name())
            .record(t.elapsed().as_secs_f64());

        info!("Extracted {} input dataset(s)", datasets.len());
        self.input_cache = Some(datasets);
        Ok(())
    }

    /// Force derivation of the output datasets from the current input,
    /// extracting first if the input cache is still unset.
    #[instrument(skip(self), fields(job = %self.job.job_name()))]
    pub async fn transform(&mut self) -> Result<()> {
        if self.input_cache.is_none() {
            self.extract().await?;
        }
        let input = self.input_cache.get_or_insert_with(DatasetMap::new);

        let t = Instant::now();
        let output = self.job.transform(input)?;
        histogram!("etl_transform_duration_seconds", "job" => self.job.job_name())
            .record(t.elapsed().as_secs_f64());

        info!("Derived {} output dataset(s)", output.len());
        self.output_cache = Some(output);
        Ok(())
    }

    /// Write every output dataset to `output_root/<name>`, in the order
    /// transform inserted them, and return the written paths.
    ///
    /// Populates the output cache through the lazy accessor first. Writes are
    /// not transactional: entries written before a failure stay on disk.
    #[instrument(skip(self), fields(job = %self.job.job_name()))]
    pub async fn load(&mut self) -> Result<Vec<PathBuf>> {
        self.output_data().await?;
        let datasets = self.output_cache.get_or_insert_with(DatasetMap::new);

        let mut written = Vec::with_capacity(datasets.len());
        for (name, table) in datasets.iter() {
            let dest = self.output_root.join(name);
            debug!(
                "Writing dataset '{}' ({} rows) to {}",
                name,
                table.height(),
                dest.display()
            );
            self.store.write(table, &dest).await?;
            written.push(dest);
        }

        counter!("etl_datasets_written_total", "job" => self.job.job_name())
            .increment(written.len() as u64);
        info!(
            "Wrote {} dataset(s) to {}",
            written.len(),
            self.output_root.display()
        );
        Ok(written)
    }

    /// Run the full extract → transform → load sequence, strictly in order.
    ///
    /// Every stage is forced rather than lazy, so re-running refreshes both
    /// caches. A failure in any stage aborts the remaining stages and
    /// propagates unchanged; already-written files are not rolled back.
    #[instrument(skip(self), fields(job = %self.job.job_name()))]
    pub async fn run(&mut self) -> Result<PipelineResult> {
        let job_name = self.job.job_name();
        info!("Starting pipeline for {}", job_name);
        counter!("etl_pipeline_runs_total", "job" => job_name).increment(1);
        let t_run = Instant::now();

        self.extract().await?;
        self.transform().await?;
        let written = self.load().await?;

        let duration_secs = t_run.elapsed().as_secs_f64();
        histogram!("etl_pipeline_duration_seconds", "job" => job_name).record(duration_secs);
        info!("Pipeline finished for {} in {:.2}s", job_name, duration_secs);

        Ok(PipelineResult {
            run_id: Uuid::new_v4(),
            job_name: job_name.to_string(),
            input_datasets: self.input_cache.as_ref().map_or(0, DatasetMap::len),
            output_datasets: self.output_cache.as_ref().map_or(0, DatasetMap::len),
            written,
            finished_at: Utc::now(),
            duration_secs,
        })
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| EtlError::Path {
        path: path.to_path_buf(),
        source,
    })
}
