use crate::error::{EdaError, Result, ResultExt};
use crate::session::EdaSession;
use crate::types::{
    ColumnClassification, CorrelationMatrix, GenreTokenSet, HeatmapView, OutlierReport,
    QualityReport, ScatterMatrix, ScoreBreakdown, SectionOutcome, UnivariateReport,
};
use crate::utils::{require_column, string_values};
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// First rows of the dataset as display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPreview {
    pub columns: Vec<String>,
    /// Row-major cells, `None` for missing values.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Every analysis section of a session.
///
/// Sections are computed independently; one failing section is reported
/// as an error and never prevents the others.
#[derive(Debug, Serialize)]
pub struct EdaReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Time spent building the report in milliseconds
    pub duration_ms: u64,
    /// File path or `<memory>`
    pub source: String,
    /// Dataset generation the report reflects
    pub generation: u64,
    pub row_count: usize,
    pub column_count: usize,

    // Structure
    pub classification: ColumnClassification,
    pub genre_tokens: Option<GenreTokenSet>,

    // Sections
    pub preview: SectionOutcome<DataPreview>,
    pub quality: SectionOutcome<QualityReport>,
    pub univariate: SectionOutcome<UnivariateReport>,
    pub outliers: SectionOutcome<OutlierReport>,
    pub scatter: SectionOutcome<ScatterMatrix>,
    pub correlation: SectionOutcome<CorrelationMatrix>,
    pub heatmap: SectionOutcome<HeatmapView>,
    pub score_breakdown: SectionOutcome<ScoreBreakdown>,
}

impl EdaReport {
    /// Build the report for the first configured score metric.
    pub fn build(session: &EdaSession) -> Self {
        let start = Instant::now();
        let score_breakdown = match session.config().score_metrics.first() {
            Some(metric) => session.score_breakdown(metric),
            None => Err(EdaError::InvalidConfig(
                "no score metrics configured".to_string(),
            )),
        };
        Self::assemble(session, score_breakdown, start)
    }

    /// Build the report with `metric` selected for the score bar charts.
    pub fn build_with_metric(session: &EdaSession, metric: &str) -> Self {
        let start = Instant::now();
        Self::assemble(session, session.score_breakdown(metric), start)
    }

    fn assemble(
        session: &EdaSession,
        score_breakdown: Result<ScoreBreakdown>,
        start: Instant,
    ) -> Self {
        let df = session.dataframe();

        let correlation = session.correlation().map(|matrix| (*matrix).clone());
        let heatmap = session.heatmap();

        let report = Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_ms: 0,
            source: session.source().to_string(),
            generation: session.generation(),
            row_count: df.height(),
            column_count: df.width(),
            classification: session.classification().clone(),
            genre_tokens: session.genre_tokens().cloned(),
            preview: Self::preview(session).into(),
            quality: session.quality().into(),
            univariate: session.univariate().into(),
            outliers: session.outliers().into(),
            scatter: session.scatter_matrix().into(),
            correlation: correlation.into(),
            heatmap: heatmap.into(),
            score_breakdown: score_breakdown.into(),
        };

        let report = Self {
            duration_ms: start.elapsed().as_millis() as u64,
            ..report
        };

        for (section, error) in report.failed_sections() {
            warn!("Section '{}' failed: {}", section, error);
        }
        info!("Report built in {} ms", report.duration_ms);
        report
    }

    /// Leading `preview_rows` rows of the original columns.
    ///
    /// Derived indicator columns are left out.
    pub fn preview(session: &EdaSession) -> Result<DataPreview> {
        let df = session.dataframe();
        let hidden = session.indicator_columns();
        let head = df.head(Some(session.config().preview_rows));

        let columns: Vec<String> = crate::utils::column_names(&head)
            .into_iter()
            .filter(|c| !hidden.contains(c))
            .collect();

        let mut cells = Vec::with_capacity(columns.len());
        for column in &columns {
            cells.push(
                string_values(require_column(&head, column)?)
                    .context(format!("Previewing column '{column}'"))?,
            );
        }

        let rows = (0..head.height())
            .map(|row| cells.iter().map(|column| column[row].clone()).collect())
            .collect();

        Ok(DataPreview { columns, rows })
    }

    /// Names and errors of the sections that failed.
    pub fn failed_sections(&self) -> Vec<(&'static str, &EdaError)> {
        let sections = [
            ("preview", self.preview.error()),
            ("quality", self.quality.error()),
            ("univariate", self.univariate.error()),
            ("outliers", self.outliers.error()),
            ("scatter", self.scatter.error()),
            ("correlation", self.correlation.error()),
            ("heatmap", self.heatmap.error()),
            ("score_breakdown", self.score_breakdown.error()),
        ];
        sections
            .into_iter()
            .filter_map(|(name, error)| error.map(|e| (name, e)))
            .collect()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdaConfig;
    use polars::prelude::*;

    fn catalog() -> DataFrame {
        df![
            "Title" => ["A", "B", "C", "D", "E"],
            "Genre" => [Some("Drama, Comedy"), Some("Comedy"), Some("Drama"), None, Some("Horror")],
            "Series or Movie" => ["Movie", "Series", "Movie", "Movie", "Series"],
            "IMDb Score" => [Some(8.0f64), Some(6.0), Some(7.5), Some(5.0), None],
            "Hidden Gem Score" => [4.0f64, 2.0, 3.5, 1.0, 5.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_build_all_sections_ok() {
        let session = EdaSession::from_dataframe(catalog(), EdaConfig::default()).unwrap();
        let report = EdaReport::build_with_metric(&session, "IMDb Score");

        assert!(report.failed_sections().is_empty());
        assert_eq!(report.row_count, 5);
        assert_eq!(report.source, "<memory>");
        assert_eq!(
            report.score_breakdown.data().unwrap().metric,
            "IMDb Score"
        );
        assert!(report.heatmap.data().unwrap().masked_upper_triangle);
    }

    #[test]
    fn test_default_metric_is_first_configured() {
        let session = EdaSession::from_dataframe(catalog(), EdaConfig::default()).unwrap();
        let report = EdaReport::build(&session);
        assert_eq!(
            report.score_breakdown.data().unwrap().metric,
            "Hidden Gem Score"
        );
    }

    #[test]
    fn test_failing_section_does_not_block_others() {
        let config = EdaConfig::builder()
            .categorical_columns(["Country"])
            .build()
            .unwrap();
        let session = EdaSession::from_dataframe(catalog(), config).unwrap();
        let report = EdaReport::build_with_metric(&session, "Boxoffice");

        let failed: Vec<&str> = report.failed_sections().iter().map(|(s, _)| *s).collect();
        assert_eq!(failed, vec!["univariate", "score_breakdown"]);
        assert_eq!(
            report.score_breakdown.error().unwrap().error_code(),
            "INVALID_CONFIG"
        );
        assert!(report.quality.is_ok());
        assert!(report.outliers.is_ok());
        assert!(report.correlation.is_ok());
    }

    #[test]
    fn test_preview_excludes_indicators() {
        let config = EdaConfig::builder().preview_rows(2).build().unwrap();
        let session = EdaSession::from_dataframe(catalog(), config).unwrap();
        let preview = EdaReport::preview(&session).unwrap();

        assert_eq!(
            preview.columns,
            vec!["Title", "Genre", "Series or Movie", "IMDb Score", "Hidden Gem Score"]
        );
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0][0].as_deref(), Some("A"));
        assert_eq!(preview.rows[0][1].as_deref(), Some("Drama, Comedy"));
    }

    #[test]
    fn test_report_serializes() {
        let session = EdaSession::from_dataframe(catalog(), EdaConfig::default()).unwrap();
        let report = EdaReport::build(&session);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["quality"]["status"], "ok");
        assert_eq!(json["quality"]["data"]["duplicate_count"], 0);
        assert!(json["generated_at"].is_string());
        assert_eq!(json["genre_tokens"]["tokens"][0], "Comedy");
    }

    #[test]
    fn test_duration_covers_score_breakdown() {
        let session = EdaSession::from_dataframe(catalog(), EdaConfig::default()).unwrap();
        assert_eq!(session.cached_aggregations(), 0);

        let outer = Instant::now();
        let report = EdaReport::build_with_metric(&session, "IMDb Score");
        let elapsed = outer.elapsed().as_millis() as u64;

        // Aggregations ran inside the timed build
        assert!(session.cached_aggregations() > 0);
        assert!(report.duration_ms <= elapsed);
    }
}
