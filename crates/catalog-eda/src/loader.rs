//! Dataset loading.
//!
//! Reads a delimited file into a polars `DataFrame`. Row widths are
//! checked with a strict `csv` reader first so a ragged file fails with a
//! parse error instead of being silently padded with nulls.

use crate::config::EdaConfig;
use crate::error::{EdaError, Result};
use crate::utils::MISSING_MARKERS;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, error, info};

/// Loads the catalog file into memory.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load the file named by `config.data_path`.
    pub fn load(config: &EdaConfig) -> Result<DataFrame> {
        let path = config
            .data_path
            .as_ref()
            .ok_or_else(|| EdaError::InvalidConfig("no data_path configured".to_string()))?;
        Self::load_path(path, config)
    }

    /// Load a delimited file from disk.
    ///
    /// A missing or unreadable file is returned as [`EdaError::Io`] as-is.
    pub fn load_path(path: impl AsRef<Path>, config: &EdaConfig) -> Result<DataFrame> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());

        let bytes = std::fs::read(path).map_err(|e| {
            error!("Could not read {}: {}", path.display(), e);
            EdaError::Io(e)
        })?;

        let df = Self::load_bytes(bytes, config)?;
        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }

    /// Load delimited content from any reader (used for in-memory fixtures).
    pub fn load_reader<R: Read>(mut reader: R, config: &EdaConfig) -> Result<DataFrame> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::load_bytes(bytes, config)
    }

    /// Parse delimited content held in memory.
    pub fn load_bytes(bytes: Vec<u8>, config: &EdaConfig) -> Result<DataFrame> {
        let delimiter = config.delimiter_byte();
        let columns = validate_row_widths(&bytes, delimiter)?;
        debug!("Row widths consistent ({} columns)", columns);

        let null_values = MISSING_MARKERS
            .iter()
            .map(|marker| PlSmallStr::from(*marker))
            .collect();

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(delimiter)
                    .with_quote_char(Some(b'"'))
                    .with_null_values(Some(NullValues::AllColumns(null_values))),
            )
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| EdaError::Parse(e.to_string()))
    }
}

/// Check that every record has as many fields as the header.
///
/// Returns the number of columns.
fn validate_row_widths(bytes: &[u8], delimiter: u8) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let width = reader
        .byte_headers()
        .map_err(|e| EdaError::Parse(e.to_string()))?
        .len();
    if width == 0 {
        return Err(EdaError::Parse("input has no header row".to_string()));
    }

    for record in reader.byte_records() {
        record.map_err(|e| EdaError::Parse(e.to_string()))?;
    }

    Ok(width)
}
