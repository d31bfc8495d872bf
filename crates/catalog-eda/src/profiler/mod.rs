//! Column profiling for the catalog dataset.
//!
//! This module provides:
//! - Column classification (numeric, categorical, multi-valued)
//! - Descriptive statistics, quantiles and histograms
//! - Univariate distributions per column kind

mod statistics;
mod type_inference;
mod univariate;

use crate::config::EdaConfig;
use crate::error::{Result, ResultExt};
use crate::types::{ClassifiedColumn, ColumnClassification, ColumnKind};
use polars::prelude::*;
use tracing::{debug, warn};

pub use statistics::{IQR_MULTIPLIER, MIN_OUTLIER_VALUES};
pub use univariate::UnivariateProfiler;

pub(crate) use statistics::{calculate_skewness, has_variance, iqr_bounds, pearson};

/// Assigns every column exactly one [`ColumnKind`].
pub struct ColumnClassifier;

impl ColumnClassifier {
    /// Classify every column of the dataset, in column order.
    ///
    /// Precedence: `column_overrides`, then the designated genre column,
    /// then value-based inference.
    pub fn classify(df: &DataFrame, config: &EdaConfig) -> Result<ColumnClassification> {
        for name in config.column_overrides.keys() {
            if df.column(name).is_err() {
                warn!("Override for unknown column '{}' ignored", name);
            }
        }

        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let kind = Self::classify_series(series, config)?;
            columns.push(ClassifiedColumn {
                name: series.name().to_string(),
                dtype: format!("{:?}", series.dtype()),
                kind,
            });
        }

        let classification = ColumnClassification { columns };
        debug!(
            "Classified {} columns: {} numeric, {} categorical, {} multi-valued",
            classification.len(),
            classification.numeric().len(),
            classification.categorical().len(),
            classification.multi_valued().len()
        );
        Ok(classification)
    }

    /// Classify a single column.
    pub fn classify_series(series: &Series, config: &EdaConfig) -> Result<ColumnKind> {
        let name = series.name().as_str();

        if let Some(kind) = config.column_overrides.get(name) {
            return Ok(*kind);
        }

        if config.genre_column.as_deref() == Some(name) {
            return Ok(ColumnKind::MultiValued);
        }

        type_inference::infer_column_kind(series, config)
            .context(format!("Classifying column '{name}'"))
    }
}
