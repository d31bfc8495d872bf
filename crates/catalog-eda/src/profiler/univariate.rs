//! Per-column distributions: histograms and count tables.

use super::statistics::{build_histogram, describe};
use crate::config::EdaConfig;
use crate::error::{Result, ResultExt};
use crate::expander::row_tokens;
use crate::types::{
    CategoryCount, ColumnClassification, ColumnKind, FrequencyTable, NumericSummary,
    UnivariateReport,
};
use crate::utils::{numeric_values, ordered_counts, percentage, require_column, string_values};
use polars::prelude::*;
use tracing::debug;

/// Builds the univariate section of the report.
pub struct UnivariateProfiler;

impl UnivariateProfiler {
    /// Profile every column by kind.
    ///
    /// `hidden` lists derived columns (genre indicators) that never get
    /// a count table of their own.
    pub fn profile(
        df: &DataFrame,
        classification: &ColumnClassification,
        hidden: &[String],
        config: &EdaConfig,
    ) -> Result<UnivariateReport> {
        let mut report = UnivariateReport::default();

        for column in classification.numeric() {
            report
                .numeric
                .push(Self::numeric_summary(df, &column, config.histogram_bins)?);
        }

        let categorical = match &config.categorical_columns {
            Some(selected) => selected.clone(),
            None => classification
                .categorical()
                .into_iter()
                .filter(|c| !hidden.contains(c))
                .collect(),
        };
        for column in categorical {
            let kind = classification
                .kind_of(&column)
                .unwrap_or(ColumnKind::Categorical);
            report
                .categorical
                .push(Self::frequency_table(df, &column, kind)?);
        }

        for column in classification.multi_valued() {
            report
                .multi_valued
                .push(Self::token_frequencies(df, &column, &config.list_delimiter)?);
        }

        debug!(
            "Univariate profile: {} numeric, {} categorical, {} multi-valued",
            report.numeric.len(),
            report.categorical.len(),
            report.multi_valued.len()
        );
        Ok(report)
    }

    /// Histogram-ready values and descriptive statistics of a numeric column.
    pub fn numeric_summary(df: &DataFrame, column: &str, bins: usize) -> Result<NumericSummary> {
        let series = require_column(df, column)?;
        let raw = numeric_values(series).context(format!("Reading numeric column '{column}'"))?;
        let values: Vec<f64> = raw.iter().flatten().copied().collect();

        Ok(NumericSummary {
            column: column.to_string(),
            count: values.len(),
            missing_count: raw.len() - values.len(),
            stats: describe(&values),
            histogram: build_histogram(&values, bins),
            values,
        })
    }

    /// Value counts of a categorical column, most frequent first.
    pub fn frequency_table(df: &DataFrame, column: &str, kind: ColumnKind) -> Result<FrequencyTable> {
        let series = require_column(df, column)?;
        let values = string_values(series).context(format!("Reading column '{column}'"))?;
        let present: Vec<&String> = values.iter().flatten().collect();
        let total = present.len();

        Ok(FrequencyTable {
            column: column.to_string(),
            kind,
            missing_count: values.len() - total,
            entries: to_entries(ordered_counts(present), total),
        })
    }

    /// Token counts of a multi-valued column; a row counts once per token.
    pub fn token_frequencies(
        df: &DataFrame,
        column: &str,
        delimiter: &str,
    ) -> Result<FrequencyTable> {
        let series = require_column(df, column)?;
        let missing_count = series.null_count();
        let tagged_rows = series.len() - missing_count;

        // Tokens within a row are sorted, so first-seen ties follow row order
        let rows = row_tokens(series, delimiter)?;
        let tokens = rows.iter().flatten();

        Ok(FrequencyTable {
            column: column.to_string(),
            kind: ColumnKind::MultiValued,
            missing_count,
            entries: to_entries(ordered_counts(tokens), tagged_rows),
        })
    }
}

fn to_entries(counts: Vec<(String, usize)>, total: usize) -> Vec<CategoryCount> {
    counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            percentage: percentage(count, total),
            value,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassifiedColumn;

    fn catalog() -> DataFrame {
        df![
            "Series or Movie" => ["Movie", "Series", "Movie", "Movie"],
            "Genre" => [Some("Drama, Comedy"), Some("Comedy"), None, Some("Drama")],
            "IMDb Score" => [Some(7.0f64), Some(8.0), None, Some(9.0)],
            "Genre-Drama" => [true, false, false, true],
        ]
        .unwrap()
    }

    fn classification() -> ColumnClassification {
        let column = |name: &str, kind| ClassifiedColumn {
            name: name.to_string(),
            dtype: "String".to_string(),
            kind,
        };
        ColumnClassification {
            columns: vec![
                column("Series or Movie", ColumnKind::Categorical),
                column("Genre", ColumnKind::MultiValued),
                column("IMDb Score", ColumnKind::Numeric),
                column("Genre-Drama", ColumnKind::Categorical),
            ],
        }
    }

    #[test]
    fn test_numeric_summary() {
        let summary = UnivariateProfiler::numeric_summary(&catalog(), "IMDb Score", 4).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.missing_count, 1);
        assert_eq!(summary.values, vec![7.0, 8.0, 9.0]);
        let stats = summary.stats.unwrap();
        assert_eq!(stats.median, 8.0);
        assert_eq!(stats.min, 7.0);
        assert_eq!(summary.histogram.len(), 4);
        assert_eq!(
            summary.histogram.iter().map(|b| b.count).sum::<usize>(),
            3
        );
    }

    #[test]
    fn test_frequency_table() {
        let table = UnivariateProfiler::frequency_table(
            &catalog(),
            "Series or Movie",
            ColumnKind::Categorical,
        )
        .unwrap();
        assert_eq!(table.entries[0].value, "Movie");
        assert_eq!(table.entries[0].count, 3);
        assert_eq!(table.entries[0].percentage, 75.0);
        assert_eq!(table.missing_count, 0);
    }

    #[test]
    fn test_token_frequencies() {
        let table = UnivariateProfiler::token_frequencies(&catalog(), "Genre", ",").unwrap();
        assert_eq!(table.missing_count, 1);
        // Comedy and Drama tie at 2; both first appear in row 0
        assert_eq!(table.entries[0].value, "Comedy");
        assert_eq!(table.entries[0].count, 2);
        assert_eq!(table.entries[1].value, "Drama");
        assert_eq!(table.entries[1].count, 2);
        assert!((table.entries[0].percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_hides_indicator_columns() {
        let report = UnivariateProfiler::profile(
            &catalog(),
            &classification(),
            &["Genre-Drama".to_string()],
            &EdaConfig::default(),
        )
        .unwrap();

        assert_eq!(report.numeric.len(), 1);
        assert_eq!(report.categorical.len(), 1);
        assert!(report.frequency_table("Genre-Drama").is_none());
        assert!(report.frequency_table("Genre").is_some());
        assert!(report.numeric_summary("IMDb Score").is_some());
    }

    #[test]
    fn test_profile_selected_categorical_columns() {
        let config = EdaConfig::builder()
            .categorical_columns(["Genre-Drama"])
            .build()
            .unwrap();
        let report =
            UnivariateProfiler::profile(&catalog(), &classification(), &[], &config).unwrap();
        assert_eq!(report.categorical.len(), 1);
        assert_eq!(report.categorical[0].column, "Genre-Drama");
    }

    #[test]
    fn test_profile_unknown_selected_column() {
        let config = EdaConfig::builder()
            .categorical_columns(["Country"])
            .build()
            .unwrap();
        let err =
            UnivariateProfiler::profile(&catalog(), &classification(), &[], &config).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
    }
}
