//! Dataset-wide analyses over the classified columns.
//!
//! - [`OutlierDetector`]: IQR rule per numeric column, optionally skew-gated
//! - [`Aggregator`]: grouped counts and means for the score bar charts
//! - [`CorrelationEngine`]: pairwise Pearson matrix and its heatmap view
//! - [`ScatterMatrixBuilder`]: pairwise-complete points for the pair plot

mod aggregator;
mod correlation;
mod outliers;
mod scatter;

pub use aggregator::Aggregator;
pub use correlation::CorrelationEngine;
pub use outliers::OutlierDetector;
pub use scatter::ScatterMatrixBuilder;

use crate::error::{Result, ResultExt};
use crate::utils::{numeric_values, require_column};
use polars::prelude::*;

/// Raw values of several numeric columns, missing entries as `None`.
fn numeric_columns(df: &DataFrame, columns: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
    columns
        .iter()
        .map(|name| {
            numeric_values(require_column(df, name)?)
                .context(format!("Reading numeric column '{name}'"))
        })
        .collect()
}

/// Rows where both columns have a value.
fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .collect()
}
