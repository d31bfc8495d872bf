//! One-hot expansion of a multi-valued column.
//!
//! Every distinct token of the designated column (the genre list) becomes
//! a boolean indicator column named from `genre_column_template`.

use crate::config::{EdaConfig, TOKEN_PLACEHOLDER};
use crate::error::{EdaError, Result, ResultExt};
use crate::types::GenreTokenSet;
use crate::utils::{require_column, string_values};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, info};

const DEFAULT_LIST_DELIMITER: &str = ",";

// Comma with any surrounding whitespace
static DEFAULT_LIST_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("Invalid regex: list separator"));

/// Split a list cell into trimmed, non-empty tokens.
pub fn split_list<'a>(value: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter == DEFAULT_LIST_DELIMITER {
        DEFAULT_LIST_SPLIT
            .split(value)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    } else {
        value
            .split(delimiter)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Tokens of every row of a column; missing cells yield an empty set.
pub(crate) fn row_tokens(series: &Series, delimiter: &str) -> Result<Vec<BTreeSet<String>>> {
    let values = string_values(series).context("Reading list column")?;
    Ok(values
        .iter()
        .map(|cell| match cell {
            Some(text) => split_list(text, delimiter)
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => BTreeSet::new(),
        })
        .collect())
}

/// Derives indicator columns from a multi-valued column.
pub struct GenreExpander;

impl GenreExpander {
    /// Collect the sorted distinct tokens of a column without touching the dataset.
    pub fn discover_tokens(
        df: &DataFrame,
        column: &str,
        config: &EdaConfig,
    ) -> Result<GenreTokenSet> {
        let series = require_column(df, column)?;
        let rows = row_tokens(series, &config.list_delimiter)?;
        let tokens: BTreeSet<String> = rows.into_iter().flatten().collect();

        Ok(GenreTokenSet {
            column: column.to_string(),
            tokens,
        })
    }

    /// Append one boolean column per token.
    ///
    /// A row is true iff its cell carries the token. An indicator whose
    /// name is already taken fails with [`EdaError::Schema`], unless the
    /// existing column holds exactly the same flags (a previous expansion),
    /// so expanding twice leaves the dataset as after the first run. On
    /// error the dataset is left untouched.
    pub fn expand(df: &mut DataFrame, column: &str, config: &EdaConfig) -> Result<GenreTokenSet> {
        if !config.genre_column_template.contains(TOKEN_PLACEHOLDER) {
            return Err(EdaError::InvalidConfig(format!(
                "indicator column template '{}' has no {} placeholder",
                config.genre_column_template, TOKEN_PLACEHOLDER
            )));
        }

        let rows = row_tokens(require_column(df, column)?, &config.list_delimiter)?;
        let tokens: BTreeSet<String> = rows.iter().flatten().cloned().collect();

        let mut indicators = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let name = config.indicator_column_name(token);
            let flags: Vec<bool> = rows.iter().map(|row| row.contains(token)).collect();
            let indicator = Series::new(name.as_str().into(), flags);
            check_indicator_name(df, column, token, &indicator)?;
            indicators.push(indicator);
        }

        let mut expanded = df.clone();
        for indicator in indicators {
            let name = indicator.name().to_string();
            expanded
                .with_column(indicator)
                .context(format!("Adding indicator column '{name}'"))?;
            debug!("Added indicator column '{}'", name);
        }
        *df = expanded;

        info!(
            "Expanded '{}' into {} indicator columns",
            column,
            tokens.len()
        );

        Ok(GenreTokenSet {
            column: column.to_string(),
            tokens,
        })
    }

    /// Names of the indicator columns for a token set, in token order.
    pub fn indicator_columns(tokens: &GenreTokenSet, config: &EdaConfig) -> Vec<String> {
        tokens
            .iter()
            .map(|token| config.indicator_column_name(token))
            .collect()
    }
}

/// Reject an indicator that would overwrite a column it did not derive.
fn check_indicator_name(
    df: &DataFrame,
    source: &str,
    token: &str,
    indicator: &Series,
) -> Result<()> {
    let name = indicator.name().as_str();
    if name == source {
        return Err(EdaError::Schema(format!(
            "indicator column for token '{token}' would overwrite '{source}'"
        )));
    }

    match df.column(name) {
        Ok(existing)
            if existing.dtype() != &DataType::Boolean
                || !existing.as_materialized_series().equals_missing(indicator) =>
        {
            Err(EdaError::Schema(format!(
                "indicator column for token '{token}' would overwrite existing column '{name}'"
            )))
        }
        _ => Ok(()),
    }
}
