//! IQR outlier detection for numeric columns.

use crate::config::{EdaConfig, OutlierMode};
use crate::error::{EdaError, Result, ResultExt};
use crate::profiler::{calculate_skewness, iqr_bounds};
use crate::types::{ColumnClassification, ColumnOutliers, OutlierReport, OutlierStatus};
use crate::utils::{numeric_values, require_column};
use polars::prelude::*;
use tracing::{debug, info};

/// Flags numeric columns with values outside the Tukey fences.
pub struct OutlierDetector;

impl OutlierDetector {
    /// Run the outlier test on every numeric column.
    ///
    /// Columns with too few values are reported as insufficient data
    /// instead of failing the whole report.
    pub fn detect(
        df: &DataFrame,
        classification: &ColumnClassification,
        config: &EdaConfig,
    ) -> Result<OutlierReport> {
        let mut columns = Vec::new();

        for column in classification.numeric() {
            let outcome = match Self::detect_column(df, &column, config) {
                Ok(outcome) => outcome,
                Err(EdaError::InsufficientData { available, .. }) => ColumnOutliers {
                    column: column.clone(),
                    status: OutlierStatus::InsufficientData { available },
                },
                Err(e) => return Err(e),
            };
            columns.push(outcome);
        }

        let report = OutlierReport {
            mode: config.outlier_mode,
            skew_threshold: config.skew_threshold,
            columns,
        };
        info!(
            "Outlier scan: {} of {} numeric columns flagged",
            report.flagged_columns().len(),
            report.columns.len()
        );
        Ok(report)
    }

    /// Test a single column.
    ///
    /// Fails with [`EdaError::InsufficientData`] below four values.
    pub fn detect_column(df: &DataFrame, column: &str, config: &EdaConfig) -> Result<ColumnOutliers> {
        let series = require_column(df, column)?;
        let values: Vec<f64> = numeric_values(series)
            .context(format!("Reading numeric column '{column}'"))?
            .into_iter()
            .flatten()
            .collect();

        let bounds = iqr_bounds(column, &values)?;
        let skewness = calculate_skewness(&values);

        if config.outlier_mode == OutlierMode::SkewGated {
            let skew = skewness.unwrap_or(0.0);
            if skew.abs() <= config.skew_threshold {
                debug!(
                    "Skipping '{}': |skewness| {:.3} <= {}",
                    column,
                    skew.abs(),
                    config.skew_threshold
                );
                return Ok(ColumnOutliers {
                    column: column.to_string(),
                    status: OutlierStatus::BelowSkewThreshold { skewness: skew },
                });
            }
        }

        let outlier_count = values.iter().filter(|v| !bounds.contains(**v)).count();
        debug!(
            "'{}': bounds [{}, {}], {} outliers",
            column, bounds.lower_bound, bounds.upper_bound, outlier_count
        );

        Ok(ColumnOutliers {
            column: column.to_string(),
            status: OutlierStatus::Evaluated {
                bounds,
                has_outliers: outlier_count > 0,
                outlier_count,
                skewness,
            },
        })
    }
}
