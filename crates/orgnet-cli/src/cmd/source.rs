//! Input tables on disk.
//!
//! A table file is either one JSON array of objects or JSON Lines (one
//! object per line). The first non-whitespace character decides: `[` means
//! array. Blank lines in JSON Lines input are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {location}: {source}", path.display())]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a table file.
///
/// # Errors
///
/// [`SourceError::Read`] if the file cannot be read; [`SourceError::Parse`]
/// naming the offending line (JSON Lines) or position (array).
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&text).map_err(|(location, source)| SourceError::Parse {
        path: path.to_path_buf(),
        location,
        source,
    })
}

/// Parse table text, returning the failing location on error.
fn parse_table<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, (String, serde_json::Error)> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|err| {
            (
                format!("line {} column {}", err.line(), err.column()),
                err,
            )
        });
    }

    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(line).map_err(|err| (format!("line {line_no}"), err))?;
        rows.push(row);
    }
    Ok(rows)
}
