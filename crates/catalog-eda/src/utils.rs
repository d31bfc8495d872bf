//! Shared utilities for the EDA core.
//!
//! Helpers for dtype inspection, numeric string parsing, and pulling
//! plain Rust vectors out of polars columns.

use crate::error::{EdaError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for classification purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Currency and percent signs stripped before numeric parsing.
pub const NUMERIC_FORMAT_CHARS: [char; 4] = ['$', '%', '€', '£'];

// Digits grouped in threes by commas, e.g. 2,122,065.50
static THOUSANDS_GROUPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("Invalid regex: thousands grouping")
});

/// Cell contents read as missing values when loading a file.
pub const MISSING_MARKERS: [&str; 8] = ["NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A", "None"];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// Commas are only dropped when they are valid thousands separators, so a
/// list such as `"7, 8"` stays unparsable.
///
/// # Example
///
/// ```rust,ignore
/// use catalog_eda::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let stripped: String = s
        .trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect();
    let stripped = stripped.trim();

    if THOUSANDS_GROUPED.is_match(stripped) {
        stripped.replace(',', "")
    } else {
        stripped.to_string()
    }
}

/// Check if a string is one of the missing-value markers.
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || MISSING_MARKERS.iter().any(|&marker| trimmed == marker)
}

/// Try to parse a string as a finite numeric value (f64).
///
/// Handles currency symbols, percentages, and thousands separators, so a
/// box office figure like `$2,122,065` parses. Words such as "Infinity"
/// are rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check if a string can be parsed as a numeric value.
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Look up a column, mapping absence to a schema error.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| EdaError::column_not_found(name))
}

/// Column names in dataset order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Values of a column as `f64`, nulls and unparsable text as `None`.
///
/// Native numeric and boolean columns are cast; text columns go through
/// [`parse_numeric_string`].
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric | DtypeCategory::Boolean => {
            let casted = series.cast(&DataType::Float64)?;
            Ok(casted
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect())
        }
        DtypeCategory::String | DtypeCategory::Other => {
            let casted = series.cast(&DataType::String)?;
            Ok(casted
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_numeric_string))
                .collect())
        }
    }
}

/// Values of a column rendered as strings, nulls as `None`.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Percentage of `part` in `total`, 0.0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Count occurrences of each key, most frequent first.
///
/// Ties keep the order in which keys were first seen.
pub fn ordered_counts<I, K>(keys: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for key in keys {
        let key = key.as_ref();
        match index.get(key) {
            Some(&position) => counts[position].1 += 1,
            None => {
                index.insert(key.to_string(), counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Boolean
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Other);
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42%  "), "42");
        assert_eq!(clean_numeric_string("€100"), "100");
        assert_eq!(clean_numeric_string("-2,122,065"), "-2122065");
        assert_eq!(clean_numeric_string("7, 8"), "7, 8");
        assert_eq!(clean_numeric_string("12,34"), "12,34");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("$2,122,065"), Some(2_122_065.0));
        assert_eq!(parse_numeric_string("-7.5"), Some(-7.5));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("Drama"), None);
        assert_eq!(parse_numeric_string("Infinity"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("7, 8"), None);
        assert_eq!(parse_numeric_string("7,8"), None);
    }

    #[test]
    fn test_is_missing_marker() {
        assert!(is_missing_marker("N/A"));
        assert!(is_missing_marker("  "));
        assert!(is_missing_marker("NaN"));
        assert!(!is_missing_marker("Drama"));
        assert!(!is_missing_marker("0"));
    }

    #[test]
    fn test_numeric_values_from_text() {
        let series = Series::new("Boxoffice".into(), &[Some("$1,000"), None, Some("n/a?")]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1000.0), None, None]);
    }

    #[test]
    fn test_numeric_values_from_ints() {
        let series = Series::new("Votes".into(), &[Some(3i64), None, Some(5)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(3.0), None, Some(5.0)]);
    }

    #[test]
    fn test_string_values() {
        let series = Series::new("Runtime".into(), &[Some("< 30 minutes"), None]);
        let values = string_values(&series).unwrap();
        assert_eq!(values, vec![Some("< 30 minutes".to_string()), None]);
    }

    #[test]
    fn test_require_column_missing() {
        let df = df!["a" => [1i32, 2]].unwrap();
        let err = require_column(&df, "b").unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
        assert!(require_column(&df, "a").is_ok());
    }

    #[test]
    fn test_ordered_counts_first_seen_ties() {
        let counts = ordered_counts(["Movie", "Series", "Series", "Movie", "Special"]);
        assert_eq!(
            counts,
            vec![
                ("Movie".to_string(), 2),
                ("Series".to_string(), 2),
                ("Special".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
