//! Grouped counts and means behind the score bar charts.

use crate::config::EdaConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::expander::{GenreExpander, row_tokens};
use crate::types::{
    AggregationResult, ColumnClassification, ColumnKind, GenreTokenSet, GroupAggregate,
};
use crate::utils::{numeric_values, require_column, string_values};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
struct GroupAccumulator {
    category: String,
    count: usize,
    metric_sum: f64,
    metric_count: usize,
}

impl GroupAccumulator {
    fn finish(self) -> GroupAggregate {
        GroupAggregate {
            mean: (self.metric_count > 0).then(|| self.metric_sum / self.metric_count as f64),
            category: self.category,
            count: self.count,
            metric_count: self.metric_count,
        }
    }
}

/// Groups a numeric metric by a categorical or multi-valued dimension.
pub struct Aggregator;

impl Aggregator {
    /// Count rows and average `metric` per group of `dimension`.
    ///
    /// Categorical dimensions group by raw value. Multi-valued dimensions
    /// group by token, so a row counts toward every token it carries.
    /// High-cardinality dimensions keep only the `top_n` largest groups.
    pub fn aggregate(
        df: &DataFrame,
        classification: &ColumnClassification,
        tokens: Option<&GenreTokenSet>,
        dimension: &str,
        metric: &str,
        config: &EdaConfig,
    ) -> Result<AggregationResult> {
        require_column(df, dimension)?;
        let metric_series = require_column(df, metric)?;

        if classification.kind_of(metric) != Some(ColumnKind::Numeric) {
            return Err(EdaError::Schema(format!("metric '{metric}' is not numeric")));
        }
        let dimension_kind = classification
            .kind_of(dimension)
            .ok_or_else(|| EdaError::column_not_found(dimension))?;

        let metric_values =
            numeric_values(metric_series).context(format!("Reading metric '{metric}'"))?;

        let memberships = match dimension_kind {
            ColumnKind::MultiValued => {
                Self::token_memberships(df, tokens, dimension, config)?
            }
            ColumnKind::Categorical | ColumnKind::Numeric => {
                Self::value_memberships(df, dimension)?
            }
        };

        let mut groups = accumulate(&memberships, &metric_values);
        let distinct_groups = groups.len();

        // Stable: equal counts keep first-seen order
        groups.sort_by(|a, b| b.count.cmp(&a.count));

        let truncated = config.is_high_cardinality(dimension) && distinct_groups > config.top_n;
        if truncated {
            groups.truncate(config.top_n);
        }

        debug!(
            "Aggregated '{}' by '{}': {} groups{}",
            metric,
            dimension,
            distinct_groups,
            if truncated { " (truncated)" } else { "" }
        );

        Ok(AggregationResult {
            dimension: dimension.to_string(),
            metric: metric.to_string(),
            dimension_kind,
            groups: groups.into_iter().map(GroupAccumulator::finish).collect(),
            distinct_groups,
            truncated,
        })
    }

    /// Reject a metric that is not one of the selectable score metrics.
    pub fn check_score_metric(metric: &str, config: &EdaConfig) -> Result<()> {
        if config.score_metrics.iter().any(|m| m == metric) {
            Ok(())
        } else {
            Err(EdaError::InvalidConfig(format!(
                "'{}' is not a selectable score metric (expected one of: {})",
                metric,
                config.score_metrics.join(", ")
            )))
        }
    }

    /// One group per row: its raw value, or none when missing.
    fn value_memberships(df: &DataFrame, dimension: &str) -> Result<Vec<Vec<String>>> {
        let values = string_values(require_column(df, dimension)?)
            .context(format!("Reading dimension '{dimension}'"))?;
        Ok(values
            .into_iter()
            .map(|value| value.into_iter().collect())
            .collect())
    }

    /// Token groups per row, from indicator columns when available.
    fn token_memberships(
        df: &DataFrame,
        tokens: Option<&GenreTokenSet>,
        dimension: &str,
        config: &EdaConfig,
    ) -> Result<Vec<Vec<String>>> {
        if let Some(tokens) = tokens.filter(|t| t.column == dimension) {
            let indicators = GenreExpander::indicator_columns(tokens, config);
            if indicators.iter().all(|name| df.column(name).is_ok()) {
                return Self::indicator_memberships(df, tokens, &indicators);
            }
        }

        let rows = row_tokens(require_column(df, dimension)?, &config.list_delimiter)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect())
    }

    fn indicator_memberships(
        df: &DataFrame,
        tokens: &GenreTokenSet,
        indicators: &[String],
    ) -> Result<Vec<Vec<String>>> {
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); df.height()];

        // Tokens are visited in sorted order, matching the split path
        for (token, name) in tokens.iter().zip(indicators) {
            let flags = require_column(df, name)?
                .bool()
                .context(format!("Indicator column '{name}'"))?;
            for (row, flag) in rows.iter_mut().zip(flags.into_iter()) {
                if flag == Some(true) {
                    row.push(token.to_string());
                }
            }
        }

        Ok(rows)
    }
}

/// Fold rows into groups in first-seen order.
fn accumulate(memberships: &[Vec<String>], metric: &[Option<f64>]) -> Vec<GroupAccumulator> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupAccumulator> = Vec::new();

    for (row, value) in memberships.iter().zip(metric) {
        for category in row {
            let position = *index.entry(category.as_str()).or_insert_with(|| {
                groups.push(GroupAccumulator {
                    category: category.clone(),
                    count: 0,
                    metric_sum: 0.0,
                    metric_count: 0,
                });
                groups.len() - 1
            });

            let group = &mut groups[position];
            group.count += 1;
            if let Some(value) = value {
                group.metric_sum += value;
                group.metric_count += 1;
            }
        }
    }

    groups
}
