use crate::error::{Result, ResultExt};
use crate::types::{ColumnClassification, ColumnInfo, ColumnKind, QualityReport};
use crate::utils::percentage;
use polars::prelude::*;
use tracing::{debug, info};

pub struct QualityAuditor;

impl QualityAuditor {
    /// Count duplicate rows and missing values.
    pub fn audit(df: &DataFrame, classification: &ColumnClassification) -> Result<QualityReport> {
        let duplicate_count = Self::duplicate_count(df)?;
        let row_count = df.height();

        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let name = column.name().to_string();
            let missing_count = column.null_count();
            columns.push(ColumnInfo {
                kind: classification
                    .kind_of(&name)
                    .unwrap_or(ColumnKind::Categorical),
                dtype: format!("{:?}", column.dtype()),
                non_null_count: row_count - missing_count,
                missing_percentage: percentage(missing_count, row_count),
                missing_count,
                name,
            });
        }

        let total_missing_cells: usize = columns.iter().map(|c| c.missing_count).sum();
        let columns_with_missing = columns.iter().filter(|c| c.missing_count > 0).count();

        info!(
            "Quality audit: {} duplicate rows, {} missing cells in {} columns",
            duplicate_count, total_missing_cells, columns_with_missing
        );

        Ok(QualityReport {
            row_count,
            column_count: df.width(),
            duplicate_count,
            no_duplicates: duplicate_count == 0,
            total_missing_cells,
            columns_with_missing,
            no_missing_values: total_missing_cells == 0,
            columns,
        })
    }

    /// Rows identical to an earlier row across every column.
    pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
        if df.height() == 0 {
            return Ok(0);
        }
        let unique = df
            .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)
            .context("Counting duplicate rows")?;
        let count = df.height() - unique.height();
        debug!("{} of {} rows are duplicates", count, df.height());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassifiedColumn;

    fn classification(df: &DataFrame) -> ColumnClassification {
        ColumnClassification {
            columns: df
                .get_columns()
                .iter()
                .map(|c| ClassifiedColumn {
                    name: c.name().to_string(),
                    dtype: format!("{:?}", c.dtype()),
                    kind: ColumnKind::Categorical,
                })
                .collect(),
        }
    }

    #[test]
    fn test_clean_dataset() {
        let df = df![
            "Title" => ["A", "B", "C"],
            "IMDb Score" => [7.0f64, 8.0, 9.0],
        ]
        .unwrap();
        let report = QualityAuditor::audit(&df, &classification(&df)).unwrap();

        assert_eq!(report.duplicate_count, 0);
        assert!(report.no_duplicates);
        assert_eq!(report.total_missing_cells, 0);
        assert!(report.no_missing_values);
        assert_eq!(report.columns_with_missing, 0);
        assert_eq!(report.row_count, 3);
        assert_eq!(report.column_count, 2);
    }

    #[test]
    fn test_one_duplicate_pair() {
        let df = df![
            "Title" => ["A", "B", "A"],
            "IMDb Score" => [7.0f64, 8.0, 7.0],
        ]
        .unwrap();
        let report = QualityAuditor::audit(&df, &classification(&df)).unwrap();

        assert_eq!(report.duplicate_count, 1);
        assert!(!report.no_duplicates);
    }

    #[test]
    fn test_partial_match_is_not_duplicate() {
        let df = df![
            "Title" => ["A", "A"],
            "IMDb Score" => [7.0f64, 7.5],
        ]
        .unwrap();
        assert_eq!(QualityAuditor::duplicate_count(&df).unwrap(), 0);
    }

    #[test]
    fn test_missing_counts() {
        let df = df![
            "Title" => [Some("A"), Some("B"), None, Some("D")],
            "IMDb Score" => [Some(7.0f64), None, None, Some(6.0)],
        ]
        .unwrap();
        let report = QualityAuditor::audit(&df, &classification(&df)).unwrap();

        assert_eq!(report.missing_count("Title"), Some(1));
        assert_eq!(report.missing_count("IMDb Score"), Some(2));
        assert_eq!(report.total_missing_cells, 3);
        assert_eq!(report.columns_with_missing, 2);
        assert!(!report.no_missing_values);

        let score = &report.columns[1];
        assert_eq!(score.non_null_count, 2);
        assert_eq!(score.missing_percentage, 50.0);
    }

    #[test]
    fn test_empty_dataset() {
        let df = df!["Title" => Vec::<String>::new()].unwrap();
        let report = QualityAuditor::audit(&df, &classification(&df)).unwrap();
        assert_eq!(report.duplicate_count, 0);
        assert!(report.no_missing_values);
    }
}
