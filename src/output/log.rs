//! Append-only identifier logs
//!
//! One identifier per line with a trailing comma (`"730,\n"`), so the files can be
//! read back as a single-column table.

use crate::{AppId, HarvestError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An append-only log of identifiers
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one identifier line
    pub fn append(&self, appid: AppId) -> Result<(), HarvestError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{},", appid)?;
        Ok(())
    }

    /// Reads every identifier back in append order
    ///
    /// A missing log reads as empty. Lines that do not hold a number are ignored.
    pub fn read_ids(&self) -> Result<Vec<AppId>, HarvestError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter_map(|line| line.trim().trim_end_matches(',').trim().parse().ok())
            .collect())
    }
}
