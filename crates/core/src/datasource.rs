//! Where records and filter options come from.

use crate::catalog::OptionCatalog;
use crate::config::CoreConfig;
use crate::constants::{FILTER_OPTIONS_FILENAME, RECORDS_FILENAME};
use crate::record::RecordEntity;
use crate::{ContactsError, ContactsResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies the record collection and the option catalog.
pub trait DataSource {
    fn list_records(&self) -> ContactsResult<Vec<RecordEntity>>;

    fn list_option_catalog(&self) -> ContactsResult<OptionCatalog>;
}

/// Data held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticDataSource {
    records: Vec<RecordEntity>,
    catalog: OptionCatalog,
}

impl StaticDataSource {
    pub fn new(records: Vec<RecordEntity>, catalog: OptionCatalog) -> Self {
        Self { records, catalog }
    }
}

impl DataSource for StaticDataSource {
    fn list_records(&self) -> ContactsResult<Vec<RecordEntity>> {
        Ok(self.records.clone())
    }

    fn list_option_catalog(&self) -> ContactsResult<OptionCatalog> {
        Ok(self.catalog.clone())
    }
}

/// Reads `records.json` and `filter_options.json` from a data directory.
///
/// A missing options file yields an empty catalog; a missing records file is an error.
#[derive(Clone, Debug)]
pub struct JsonDirDataSource {
    dir: PathBuf,
}

impl JsonDirDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ContactsResult<T> {
    let contents = fs::read_to_string(path).map_err(ContactsError::FileRead)?;
    serde_json::from_str(&contents).map_err(|source| ContactsError::Deserialization {
        file: path.display().to_string(),
        source,
    })
}

impl DataSource for JsonDirDataSource {
    fn list_records(&self) -> ContactsResult<Vec<RecordEntity>> {
        let path = self.dir.join(RECORDS_FILENAME);
        let records: Vec<RecordEntity> = read_json(&path)?;
        tracing::info!("loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    fn list_option_catalog(&self) -> ContactsResult<OptionCatalog> {
        let path = self.dir.join(FILTER_OPTIONS_FILENAME);
        if !path.is_file() {
            tracing::info!("no option catalog at {}, using an empty one", path.display());
            return Ok(OptionCatalog::default());
        }
        read_json(&path)
    }
}
