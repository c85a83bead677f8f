//! Identifier input
//!
//! Identifiers come from a delimited table with a header row; one column holds
//! the numeric appids. The catalog listing job writes a table of exactly this shape.

use crate::{AppId, HarvestError};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Reads the identifiers in `column` from the table at `path`, in file order
///
/// Cells that do not hold a number are logged and skipped. A table without the
/// column is an error.
pub fn read_identifiers(path: &Path, column: &str) -> Result<Vec<AppId>, HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let index = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| {
            HarvestError::Input(format!(
                "column '{}' not found in {}",
                column,
                path.display()
            ))
        })?;

    let mut ids = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        match record.get(index).map(str::parse::<AppId>) {
            Some(Ok(appid)) => ids.push(appid),
            Some(Err(_)) | None => {
                tracing::warn!(
                    "Skipping row {} of {}: '{}' is not an app id",
                    row + 2,
                    path.display(),
                    record.get(index).unwrap_or("")
                );
            }
        }
    }

    Ok(ids)
}

/// Asks for the input table name on stdin; `.csv` is appended to the answer
pub fn prompt_input_path() -> Result<PathBuf, HarvestError> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    read_input_path(&mut stdin.lock(), &mut stdout)
}

fn read_input_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf, HarvestError> {
    write!(output, "Enter file name (without .csv): ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let name = line.trim();
    if name.is_empty() {
        return Err(HarvestError::Input("no input file name given".to_string()));
    }

    Ok(PathBuf::from(format!("{}.csv", name)))
}
