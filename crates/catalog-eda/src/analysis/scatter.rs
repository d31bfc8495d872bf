//! Pairwise point sets for the scatter matrix.

use super::{complete_pairs, numeric_columns};
use crate::error::Result;
use crate::types::{ScatterMatrix, ScatterPair};
use polars::prelude::*;

pub struct ScatterMatrixBuilder;

impl ScatterMatrixBuilder {
    /// One point set per unordered column pair, `x` before `y` in column order.
    pub fn build(df: &DataFrame, columns: &[String]) -> Result<ScatterMatrix> {
        let values = numeric_columns(df, columns)?;
        let mut pairs = Vec::new();

        for i in 0..columns.len() {
            for j in (i + 1)..columns.len() {
                pairs.push(ScatterPair {
                    x: columns[i].clone(),
                    y: columns[j].clone(),
                    points: complete_pairs(&values[i], &values[j])
                        .into_iter()
                        .map(|(x, y)| [x, y])
                        .collect(),
                });
            }
        }

        Ok(ScatterMatrix {
            columns: columns.to_vec(),
            pairs,
        })
    }
}
