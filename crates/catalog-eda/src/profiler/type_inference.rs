//! Column kind inference.

use crate::config::EdaConfig;
use crate::expander::split_list;
use crate::types::ColumnKind;
use crate::utils::{DtypeCategory, get_dtype_category, is_missing_marker, is_numeric_string};
use polars::prelude::*;
use rand::prelude::*;

/// Seed for value sampling, fixed so classification is reproducible.
pub(crate) const SAMPLE_SEED: u64 = 42;

/// Infer the kind of a single column from its values.
pub(crate) fn infer_column_kind(series: &Series, config: &EdaConfig) -> PolarsResult<ColumnKind> {
    if is_numeric_column(series)? {
        return Ok(ColumnKind::Numeric);
    }

    // Booleans and anything that is not text stay categorical
    if get_dtype_category(series.dtype()) != DtypeCategory::String {
        return Ok(ColumnKind::Categorical);
    }

    let samples = sample_values(series, config.classifier_sample_size)?;
    if looks_multi_valued(&samples, config) {
        Ok(ColumnKind::MultiValued)
    } else {
        Ok(ColumnKind::Categorical)
    }
}

/// True when the column has values and every non-missing one is a number.
pub(crate) fn is_numeric_column(series: &Series) -> PolarsResult<bool> {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => Ok(true),
        DtypeCategory::Boolean | DtypeCategory::Other => Ok(false),
        DtypeCategory::String => {
            let casted = series.cast(&DataType::String)?;
            let mut seen = 0usize;
            for value in casted.str()?.into_iter().flatten() {
                if is_missing_marker(value) {
                    continue;
                }
                if !is_numeric_string(value) {
                    return Ok(false);
                }
                seen += 1;
            }
            Ok(seen > 0)
        }
    }
}

/// Deterministic sample of up to `sample_size` non-null values as text.
pub(crate) fn sample_values(series: &Series, sample_size: usize) -> PolarsResult<Vec<String>> {
    let casted = series.drop_nulls().cast(&DataType::String)?;
    let values: Vec<&str> = casted
        .str()?
        .into_iter()
        .flatten()
        .filter(|v| !is_missing_marker(v))
        .collect();

    if values.len() <= sample_size {
        return Ok(values.into_iter().map(str::to_string).collect());
    }

    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    Ok(values
        .choose_multiple(&mut rng, sample_size)
        .map(|v| v.to_string())
        .collect())
}

/// Whether sampled values look like delimiter-joined lists.
///
/// A sample is list-like with at least two tokens, none longer than
/// `max_list_token_length`. Any over-long token (prose) rules the column out.
pub(crate) fn looks_multi_valued(samples: &[String], config: &EdaConfig) -> bool {
    if samples.is_empty() {
        return false;
    }

    let mut list_like = 0usize;
    for sample in samples {
        let tokens = split_list(sample, &config.list_delimiter);
        if tokens
            .iter()
            .any(|t| t.chars().count() > config.max_list_token_length)
        {
            return false;
        }
        if tokens.len() >= 2 {
            list_like += 1;
        }
    }

    list_like > 0 && list_like as f64 / samples.len() as f64 >= config.multi_valued_min_ratio
}
