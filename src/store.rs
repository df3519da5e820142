use crate::error::{EtlError, Result};
use async_trait::async_trait;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Columnar file store for persisting tabular datasets
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Write a table to `dest`, replacing any existing file
    async fn write(&self, table: &DataFrame, dest: &Path) -> Result<()>;

    /// Read a table back from `src`
    async fn read(&self, src: &Path) -> Result<DataFrame>;
}

/// Parquet-backed store. Row indices are never persisted; frames carry none.
pub struct ParquetStore;

impl ParquetStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParquetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for ParquetStore {
    async fn write(&self, table: &DataFrame, dest: &Path) -> Result<()> {
        let file = File::create(dest)?;
        // Writer wants mutable access to re-chunk; clones share column buffers
        let mut table = table.clone();
        ParquetWriter::new(file)
            .finish(&mut table)
            .map_err(|source| EtlError::Serialization {
                name: dest.to_string_lossy().into_owned(),
                source,
            })?;

        debug!("Wrote {} rows to {}", table.height(), dest.display());
        Ok(())
    }

    async fn read(&self, src: &Path) -> Result<DataFrame> {
        let file = File::open(src)?;
        let table = ParquetReader::new(file).finish()?;
        Ok(table)
    }
}

/// In-memory store for development/testing
pub struct InMemoryStore {
    tables: Mutex<HashMap<PathBuf, DataFrame>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Number of tables currently held
    pub fn len(&self) -> usize {
        self.tables.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn write(&self, table: &DataFrame, dest: &Path) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.insert(dest.to_path_buf(), table.clone());

        debug!("Stored {} rows at {}", table.height(), dest.display());
        Ok(())
    }

    async fn read(&self, src: &Path) -> Result<DataFrame> {
        let tables = self.tables.lock().unwrap();
        tables.get(src).cloned().ok_or_else(|| EtlError::Source {
            message: format!("No table stored at {}", src.display()),
        })
    }
}
