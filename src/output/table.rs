//! Append-only flat table sinks
//!
//! Each write opens the table in append mode, adds the header row if the file is
//! new or empty, writes a single record and closes the file again. No handle is
//! held between writes.

use crate::HarvestError;
use serde::Serialize;
use std::fs::OpenOptions;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A flat table with a fixed column schema taken from `R`'s serde field names
#[derive(Debug, Clone)]
pub struct TableSink<R> {
    path: PathBuf,
    _record: PhantomData<fn(&R)>,
}

impl<R: Serialize> TableSink<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, writing the header first when the table is empty
    pub fn append(&self, record: &R) -> Result<(), HarvestError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        tracing::trace!("Appended record to {}", self.path.display());
        Ok(())
    }
}
