//! Catalog EDA Library
//!
//! Exploratory data analysis for a movies/series catalog, built with Rust and Polars.
//!
//! # Overview
//!
//! One parameterized pipeline: load the dataset, classify its columns,
//! expand the genre list into indicator columns, then compute every
//! analysis section as structured, serializable results:
//!
//! - **Quality Audit**: duplicate rows, missing values, column info table
//! - **Univariate Profiles**: histograms, descriptive statistics, count tables
//! - **Outlier Detection**: IQR rule per numeric column, optionally skew-gated
//! - **Score Breakdown**: counts and means of a selected score metric by
//!   categorical and multi-valued dimensions, with top-N truncation
//! - **Correlation**: pairwise-complete Pearson matrix and heatmap view
//! - **Scatter Matrix**: point sets for every numeric column pair
//!
//! Rendering is out of scope; a consumer takes the [`EdaReport`] (or the
//! individual session results) and draws tables and charts from them.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use catalog_eda::{EdaConfig, EdaSession, EdaReport, OutlierMode};
//!
//! let config = EdaConfig::builder()
//!     .data_path("data/netflix.csv")
//!     .outlier_mode(OutlierMode::SkewGated)
//!     .top_n(10)
//!     .build()?;
//!
//! let session = EdaSession::open(config)?;
//!
//! // One section at a time
//! let quality = session.quality()?;
//! println!("{} duplicate rows", quality.duplicate_count);
//!
//! let by_genre = session.aggregate("Genre", "IMDb Score")?;
//! for group in &by_genre.groups {
//!     println!("{}: {} titles, mean {:?}", group.category, group.count, group.mean);
//! }
//!
//! // Or everything at once
//! let report = EdaReport::build_with_metric(&session, "IMDb Score");
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! # Configuration
//!
//! Use [`EdaConfig`] to customize the analysis:
//!
//! ```rust,ignore
//! use catalog_eda::{ColumnKind, EdaConfig};
//!
//! let config = EdaConfig::builder()
//!     .delimiter(';')
//!     .genre_column("Genre")
//!     .genre_column_template("Genre-{token}")
//!     .column_override("Release Year", ColumnKind::Categorical)
//!     .high_cardinality_columns(["Director", "Writer", "Actors"])
//!     .correlation_exclude(["Awards Nominated For"])
//!     .mask_upper_triangle(false)
//!     .build()?;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod expander;
pub mod loader;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{Aggregator, CorrelationEngine, OutlierDetector, ScatterMatrixBuilder};
pub use config::{ConfigValidationError, EdaConfig, EdaConfigBuilder, OutlierMode};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use expander::GenreExpander;
pub use loader::DatasetLoader;
pub use profiler::{ColumnClassifier, UnivariateProfiler};
pub use quality::QualityAuditor;
pub use reporting::{DataPreview, EdaReport};
pub use session::EdaSession;
pub use types::{
    AggregationResult, ColumnClassification, ColumnKind, ColumnOutliers, CorrelationMatrix,
    CorrelationValue, GenreTokenSet, GroupAggregate, HeatmapView, IqrBounds, OutlierReport,
    OutlierStatus, QualityReport, ScatterMatrix, ScoreBreakdown, SectionOutcome,
    UnivariateReport,
};
