//! Analysis session.
//!
//! An [`EdaSession`] owns the working dataset together with its
//! configuration, column classification and genre token set. Every
//! analysis runs against the session; aggregation results and the
//! correlation matrix are memoized per dataset generation.
//!
//! # Lifecycle
//!
//! ```text
//! open / from_dataframe
//!   -> load (open only)
//!   -> expand genre column into indicator columns
//!   -> classify columns            (generation 0)
//!
//! append_column
//!   -> generation += 1, reclassify, clear caches
//! ```

mod cache;

use crate::analysis::{Aggregator, CorrelationEngine, OutlierDetector, ScatterMatrixBuilder};
use crate::config::EdaConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::expander::GenreExpander;
use crate::loader::DatasetLoader;
use crate::profiler::{ColumnClassifier, UnivariateProfiler};
use crate::quality::QualityAuditor;
use crate::types::{
    AggregationResult, ColumnClassification, ColumnOutliers, CorrelationMatrix,
    DimensionBreakdown, GenreTokenSet, HeatmapView, OutlierReport, QualityReport,
    ScatterMatrix, ScoreBreakdown, UnivariateReport,
};
use cache::{AggregationKey, AnalysisCache};
use polars::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Working dataset plus everything derived from it.
#[derive(Debug)]
pub struct EdaSession {
    df: DataFrame,
    config: EdaConfig,
    source: String,
    classification: ColumnClassification,
    genre_tokens: Option<GenreTokenSet>,
    generation: u64,
    cache: AnalysisCache,
}

static_assertions::assert_impl_all!(EdaSession: Send, Sync);

impl EdaSession {
    /// Load `config.data_path` and prepare a session.
    pub fn open(config: EdaConfig) -> Result<Self> {
        config.validate()?;
        let df = DatasetLoader::load(&config)?;
        let source = config
            .data_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self::with_source(df, config, source)
    }

    /// Prepare a session over an in-memory dataset.
    pub fn from_dataframe(df: DataFrame, config: EdaConfig) -> Result<Self> {
        Self::with_source(df, config, "<memory>".to_string())
    }

    fn with_source(mut df: DataFrame, config: EdaConfig, source: String) -> Result<Self> {
        config.validate()?;

        let genre_tokens = match &config.genre_column {
            Some(column) => Some(
                GenreExpander::expand(&mut df, column, &config)
                    .context("Expanding genre column")?,
            ),
            None => None,
        };

        let classification = ColumnClassifier::classify(&df, &config)?;
        info!(
            "Session ready: {} rows, {} columns from {}",
            df.height(),
            df.width(),
            source
        );

        Ok(Self {
            df,
            config,
            source,
            classification,
            genre_tokens,
            generation: 0,
            cache: AnalysisCache::default(),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    /// Where the dataset came from (file path or `<memory>`).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    pub fn genre_tokens(&self) -> Option<&GenreTokenSet> {
        self.genre_tokens.as_ref()
    }

    /// Counter identifying the current dataset state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Derived indicator column names.
    pub fn indicator_columns(&self) -> Vec<String> {
        self.genre_tokens
            .as_ref()
            .map(|tokens| GenreExpander::indicator_columns(tokens, &self.config))
            .unwrap_or_default()
    }

    /// Number of memoized aggregation results.
    pub fn cached_aggregations(&self) -> usize {
        self.cache.aggregation_count()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a column to the dataset.
    ///
    /// Bumps the generation, reclassifies and drops every cached result.
    pub fn append_column(&mut self, series: Series) -> Result<()> {
        let name = series.name().to_string();
        if self.df.column(&name).is_ok() {
            return Err(EdaError::Schema(format!("column '{name}' already exists")));
        }
        if series.len() != self.df.height() {
            return Err(EdaError::Schema(format!(
                "column '{}' has {} rows, dataset has {}",
                name,
                series.len(),
                self.df.height()
            )));
        }

        let classification = {
            let mut df = self.df.clone();
            df.with_column(series)
                .context(format!("Appending column '{name}'"))?;
            let classification = ColumnClassifier::classify(&df, &self.config)?;
            self.df = df;
            classification
        };

        self.classification = classification;
        self.generation += 1;
        self.cache.clear();
        debug!(
            "Appended '{}', dataset generation {}",
            name, self.generation
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Analyses
    // ------------------------------------------------------------------

    pub fn quality(&self) -> Result<QualityReport> {
        QualityAuditor::audit(&self.df, &self.classification)
    }

    pub fn univariate(&self) -> Result<UnivariateReport> {
        UnivariateProfiler::profile(
            &self.df,
            &self.classification,
            &self.indicator_columns(),
            &self.config,
        )
    }

    pub fn outliers(&self) -> Result<OutlierReport> {
        OutlierDetector::detect(&self.df, &self.classification, &self.config)
    }

    /// Outlier test for one column; fails below four values.
    pub fn column_outliers(&self, column: &str) -> Result<ColumnOutliers> {
        OutlierDetector::detect_column(&self.df, column, &self.config)
    }

    /// Grouped counts and means, memoized per generation.
    pub fn aggregate(&self, dimension: &str, metric: &str) -> Result<Arc<AggregationResult>> {
        let key = AggregationKey::new(self.generation, dimension, metric);
        if let Some(hit) = self.cache.aggregation(&key) {
            debug!("Aggregation cache hit: {} by {}", metric, dimension);
            return Ok(hit);
        }

        let result = Aggregator::aggregate(
            &self.df,
            &self.classification,
            self.genre_tokens.as_ref(),
            dimension,
            metric,
            &self.config,
        )?;
        Ok(self.cache.store_aggregation(key, result))
    }

    /// Aggregations of a selectable score metric by every score dimension.
    ///
    /// Each dimension succeeds or fails on its own.
    pub fn score_breakdown(&self, metric: &str) -> Result<ScoreBreakdown> {
        Aggregator::check_score_metric(metric, &self.config)?;

        let dimensions = self
            .config
            .score_dimensions
            .iter()
            .map(|dimension| DimensionBreakdown {
                dimension: dimension.clone(),
                outcome: self
                    .aggregate(dimension, metric)
                    .map(|result| (*result).clone())
                    .into(),
            })
            .collect();

        Ok(ScoreBreakdown {
            metric: metric.to_string(),
            dimensions,
        })
    }

    /// Pearson correlation matrix, memoized per generation.
    pub fn correlation(&self) -> Result<Arc<CorrelationMatrix>> {
        if let Some(hit) = self.cache.correlation(self.generation) {
            debug!("Correlation cache hit");
            return Ok(hit);
        }
        let matrix = CorrelationEngine::compute(&self.df, &self.classification, &self.config)?;
        Ok(self.cache.store_correlation(self.generation, matrix))
    }

    /// Correlation heatmap with the configured masking.
    pub fn heatmap(&self) -> Result<HeatmapView> {
        let matrix = self.correlation()?;
        Ok(CorrelationEngine::heatmap(
            &matrix,
            self.config.mask_upper_triangle,
        ))
    }

    pub fn scatter_matrix(&self) -> Result<ScatterMatrix> {
        let columns = CorrelationEngine::columns(&self.classification, &self.config);
        ScatterMatrixBuilder::build(&self.df, &columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnKind;

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

    fn session() -> EdaSession {
        EdaSession::from_dataframe(catalog(), EdaConfig::default()).unwrap()
    }

    #[test]
    fn test_construction_expands_genre() {
        let session = session();
        let tokens: Vec<&str> = session.genre_tokens().unwrap().iter().collect();
        assert_eq!(tokens, vec!["Comedy", "Drama", "Horror"]);
        assert_eq!(
            session.indicator_columns(),
            vec!["Genre-Comedy", "Genre-Drama", "Genre-Horror"]
        );
        assert!(session.dataframe().column("Genre-Drama").is_ok());
        assert_eq!(
            session.classification().kind_of("Genre"),
            Some(ColumnKind::MultiValued)
        );
        assert_eq!(session.generation(), 0);
        assert_eq!(session.source(), "<memory>");
    }

    #[test]
    fn test_missing_genre_column_is_schema_error() {
        let df = df!["IMDb Score" => [1.0f64, 2.0]].unwrap();
        let err = EdaSession::from_dataframe(df, EdaConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");

        let df = df!["IMDb Score" => [1.0f64, 2.0]].unwrap();
        let config = EdaConfig::builder().no_genre_column().build().unwrap();
        assert!(EdaSession::from_dataframe(df, config).is_ok());
    }

    #[test]
    fn test_open_without_path() {
        let err = EdaSession::open(EdaConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_aggregation_is_memoized() {
        let session = session();
        let first = session.aggregate("Genre", "IMDb Score").unwrap();
        let second = session.aggregate("Genre", "IMDb Score").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.cached_aggregations(), 1);

        // Errors are not cached
        assert!(session.aggregate("Country", "IMDb Score").is_err());
        assert_eq!(session.cached_aggregations(), 1);
    }

    #[test]
    fn test_correlation_is_memoized() {
        let session = session();
        let first = session.correlation().unwrap();
        let second = session.correlation().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_append_column_invalidates_caches() {
        let mut session = session();
        let before_agg = session.aggregate("Series or Movie", "IMDb Score").unwrap();
        let before_corr = session.correlation().unwrap();

        session
            .append_column(Series::new(
                "Rotten Tomatoes Score".into(),
                &[90.0f64, 40.0, 80.0, 20.0, 70.0],
            ))
            .unwrap();

        assert_eq!(session.generation(), 1);
        assert_eq!(session.cached_aggregations(), 0);
        assert_eq!(
            session.classification().kind_of("Rotten Tomatoes Score"),
            Some(ColumnKind::Numeric)
        );

        let after_agg = session.aggregate("Series or Movie", "IMDb Score").unwrap();
        let after_corr = session.correlation().unwrap();
        assert!(!Arc::ptr_eq(&before_agg, &after_agg));
        assert_eq!(*before_agg, *after_agg);
        assert_eq!(before_corr.size() + 1, after_corr.size());
    }

    #[test]
    fn test_append_column_rejects_bad_input() {
        let mut session = session();
        let err = session
            .append_column(Series::new("IMDb Score".into(), &[1.0f64, 2.0, 3.0, 4.0, 5.0]))
            .unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");

        let err = session
            .append_column(Series::new("Short".into(), &[1.0f64]))
            .unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_score_breakdown_independent_dimensions() {
        let session = session();
        let breakdown = session.score_breakdown("IMDb Score").unwrap();

        assert_eq!(breakdown.dimensions.len(), 6);
        assert!(breakdown.dimension("Series or Movie").unwrap().is_ok());
        assert!(breakdown.dimension("Genre").unwrap().is_ok());
        // Not in this dataset
        let director = breakdown.dimension("Director").unwrap();
        assert_eq!(director.error().unwrap().error_code(), "SCHEMA_ERROR");
    }

    #[test]
    fn test_score_breakdown_rejects_unknown_metric() {
        let err = session().score_breakdown("Title").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_univariate_hides_indicators() {
        let report = session().univariate().unwrap();
        assert!(report.frequency_table("Genre-Drama").is_none());
        assert!(report.frequency_table("Series or Movie").is_some());
        assert!(report.frequency_table("Genre").is_some());
    }

    #[test]
    fn test_heatmap_and_scatter() {
        let session = session();
        let view = session.heatmap().unwrap();
        assert!(view.masked_upper_triangle);
        assert_eq!(view.x_labels, vec!["IMDb Score", "Hidden Gem Score"]);

        let scatter = session.scatter_matrix().unwrap();
        assert_eq!(scatter.pairs.len(), 1);
        assert_eq!(scatter.pairs[0].points.len(), 4);
    }
}
