//! Pairwise Pearson correlation.

use super::{complete_pairs, numeric_columns};
use crate::config::EdaConfig;
use crate::error::Result;
use crate::profiler::{has_variance, pearson};
use crate::types::{ColumnClassification, CorrelationMatrix, CorrelationValue, HeatmapView};
use polars::prelude::*;
use tracing::{debug, info};

/// Computes the correlation matrix over numeric columns.
pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Numeric columns taking part in the matrix, in dataset order.
    pub fn columns(classification: &ColumnClassification, config: &EdaConfig) -> Vec<String> {
        classification
            .numeric()
            .into_iter()
            .filter(|c| !config.correlation_exclude.contains(c))
            .collect()
    }

    /// Symmetric matrix on pairwise-complete observations.
    ///
    /// A column without variance is `Undefined` in its whole row and
    /// column, diagonal included.
    pub fn compute(
        df: &DataFrame,
        classification: &ColumnClassification,
        config: &EdaConfig,
    ) -> Result<CorrelationMatrix> {
        let columns = Self::columns(classification, config);
        let values = numeric_columns(df, &columns)?;

        let defined: Vec<bool> = values
            .iter()
            .map(|column| {
                let present: Vec<f64> = column.iter().flatten().copied().collect();
                has_variance(&present)
            })
            .collect();

        let size = columns.len();
        let mut matrix = vec![vec![CorrelationValue::Undefined; size]; size];

        for i in 0..size {
            if !defined[i] {
                debug!("'{}' has no variance, correlations undefined", columns[i]);
                continue;
            }
            matrix[i][i] = CorrelationValue::Coefficient(1.0);
            for j in (i + 1)..size {
                if !defined[j] {
                    continue;
                }
                let value = pearson(&complete_pairs(&values[i], &values[j]));
                matrix[i][j] = value;
                matrix[j][i] = value;
            }
        }

        info!("Correlation matrix computed over {} columns", size);
        Ok(CorrelationMatrix {
            columns,
            values: matrix,
        })
    }

    /// Heatmap-ready view; with `mask_upper_triangle` every cell with
    /// `column >= row` is masked.
    pub fn heatmap(matrix: &CorrelationMatrix, mask_upper_triangle: bool) -> HeatmapView {
        let cells = matrix
            .values
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, value)| (!mask_upper_triangle || j < i).then_some(*value))
                    .collect()
            })
            .collect();

        HeatmapView {
            x_labels: matrix.columns.clone(),
            y_labels: matrix.columns.clone(),
            cells,
            masked_upper_triangle: mask_upper_triangle,
        }
    }
}
