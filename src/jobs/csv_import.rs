use crate::error::{EtlError, Result};
use crate::types::{DatasetMap, EtlJob};
use async_trait::async_trait;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Imports every CSV file found directly under the input root.
///
/// Datasets are keyed by file stem on extract; transform re-keys each one to
/// `<stem>.parquet` with the content unchanged, so a load round-trips the raw
/// tables into columnar form.
pub struct CsvImportJob;

impl CsvImportJob {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvImportJob {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EtlJob for CsvImportJob {
    fn job_name(&self) -> &'static str {
        "csv_import"
    }

    async fn extract(&self, input_root: &Path) -> Result<DatasetMap> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(input_root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "csv"))
            .collect();
        // Directory listing order is platform-dependent
        paths.sort();

        let mut datasets = DatasetMap::new();
        for path in paths {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| EtlError::Source {
                    message: format!("Unreadable file name: {}", path.display()),
                })?
                .to_string();

            debug!("Reading {}", path.display());
            let table = CsvReader::from_path(&path)?.finish()?;
            datasets.insert(stem, table);
        }

        info!(
            "Imported {} CSV file(s) from {}",
            datasets.len(),
            input_root.display()
        );
        Ok(datasets)
    }

    fn transform(&self, input: &DatasetMap) -> Result<DatasetMap> {
        let mut output = DatasetMap::new();
        for (name, table) in input {
            output.insert(format!("{name}.parquet"), table.clone());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn extract_picks_up_only_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("customers.csv"), "id,name\n1,ada\n2,grace\n").unwrap();
        fs::write(dir.path().join("orders.csv"), "id,total\n10,9.99\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a table").unwrap();

        let job = CsvImportJob::new();
        let datasets = job.extract(dir.path()).await.unwrap();

        assert_eq!(datasets.len(), 2);
        let names: Vec<&str> = datasets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["customers", "orders"]);
        assert_eq!(datasets["customers"].height(), 2);
        assert_eq!(datasets["orders"].height(), 1);
    }

    #[tokio::test]
    async fn transform_rekeys_to_parquet_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("customers.csv"), "id\n1\n2\n3\n").unwrap();

        let job = CsvImportJob::new();
        let input = job.extract(dir.path()).await.unwrap();
        let output = job.transform(&input).unwrap();

        assert_eq!(output.len(), 1);
        assert!(output.contains_key("customers.parquet"));
        assert_eq!(output["customers.parquet"].height(), 3);
    }
}
