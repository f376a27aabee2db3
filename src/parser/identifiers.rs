//! Parse plain identifier lists
//!
//! ```text
//! AT1G01010
//! AT1G01020
//! AT2G01010
//! ```
//!
//! One identifier per line, surrounding whitespace is removed and blank
//! lines are skipped.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::{EnrichError, EnrichResult};

/// Reads identifiers from a reader
///
/// # Errors
///
/// Returns [`EnrichError::InvalidInput`] if the data cannot be read
pub fn read<R: BufRead>(reader: R) -> EnrichResult<Vec<String>> {
    let mut res = Vec::new();
    for line in reader.lines() {
        let line = line
            .map_err(|_| EnrichError::InvalidInput("Invalid data in identifier list".to_string()))?;
        let identifier = line.trim();
        if !identifier.is_empty() {
            res.push(identifier.to_string());
        }
    }
    Ok(res)
}

/// Reads identifiers from a file
///
/// # Errors
///
/// - [`EnrichError::CannotOpenFile`] if the file cannot be opened
/// - [`EnrichError::InvalidInput`] if the data cannot be read
pub fn read_file<P: AsRef<Path>>(path: P) -> EnrichResult<Vec<String>> {
    let filename = path.as_ref().display().to_string();
    info!("Start loading identifiers from {}", filename);
    let file = File::open(path).map_err(|_| EnrichError::CannotOpenFile(filename))?;
    read(BufReader::new(file))
}
