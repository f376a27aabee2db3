//! Parse the tab-separated bin mapping
//!
//! ```text
//! BINCODE NAME                            IDENTIFIER  DESCRIPTION         TYPE
//! '1'     'Photosynthesis'                ''          'Photosynthesis'    'B'
//! '1.1'   'Photosynthesis.light reaction' ''          'light reaction'    'B'
//! '1.1.1' 'Photosynthesis.light reaction' 'at1g01010' 'PSII subunit'      'T'
//! ```
//!
//! The first line is a header and always skipped. Quotes around fields are
//! removed, the `TYPE` column is optional. Rows must be ordered so that every
//! bin appears after its parent.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::{EnrichError, EnrichResult};

/// A single row of the mapping file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingRecord {
    code: String,
    name: String,
    identifier: String,
    description: String,
    kind: Option<String>,
}

impl MappingRecord {
    /// Constructs a new record, the identifier may be empty
    pub fn new(code: &str, name: &str, identifier: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            identifier: identifier.to_string(),
            description: description.to_string(),
            kind: None,
        }
    }

    /// The bin code, e.g. `1.1.1`
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The name of the bin
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The annotated identifier, an empty string if the row defines only the bin
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The description of the bin or identifier
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The optional `TYPE` column
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches(|c| c == '\'' || c == '"')
}

/// Parses a single line of the mapping file
///
/// # Errors
///
/// Returns [`EnrichError::InvalidInput`] if the line has fewer than 4 columns
pub fn parse_line(line: &str) -> EnrichResult<MappingRecord> {
    let mut cols = line.split('\t');

    let Some(code) = cols.next() else {
        return Err(EnrichError::InvalidInput(line.to_string()));
    };
    let Some(name) = cols.next() else {
        return Err(EnrichError::InvalidInput(line.to_string()));
    };
    let Some(identifier) = cols.next() else {
        return Err(EnrichError::InvalidInput(line.to_string()));
    };
    let Some(description) = cols.next() else {
        return Err(EnrichError::InvalidInput(line.to_string()));
    };
    let kind = cols
        .next()
        .map(unquote)
        .filter(|kind| !kind.is_empty())
        .map(str::to_string);

    Ok(MappingRecord {
        code: unquote(code).to_string(),
        name: unquote(name).to_string(),
        identifier: unquote(identifier).to_string(),
        description: unquote(description).to_string(),
        kind,
    })
}

/// Parses all records from a reader, skipping the header line
///
/// # Errors
///
/// Returns [`EnrichError::InvalidInput`] for unreadable data or malformed rows
pub fn read<R: BufRead>(reader: R) -> EnrichResult<Vec<MappingRecord>> {
    let mut records = Vec::new();
    for line in reader.lines().skip(1) {
        let line =
            line.map_err(|_| EnrichError::InvalidInput("Invalid data in mapping".to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(line.trim_end_matches('\r'))?);
    }
    debug!("Parsed {} mapping records", records.len());
    Ok(records)
}

/// Parses all records of the mapping file
///
/// # Errors
///
/// - [`EnrichError::CannotOpenFile`] if the file cannot be opened
/// - [`EnrichError::InvalidInput`] for malformed rows
pub fn read_file<P: AsRef<Path>>(path: P) -> EnrichResult<Vec<MappingRecord>> {
    let filename = path.as_ref().display().to_string();
    info!("Start reading mapping from {}", filename);
    let file = File::open(path).map_err(|_| EnrichError::CannotOpenFile(filename))?;
    read(BufReader::new(file))
}
