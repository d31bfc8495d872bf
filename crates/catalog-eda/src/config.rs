//! Configuration types for the EDA pipeline.
//!
//! One [`EdaConfig`] drives every analysis section: where the data lives,
//! how the genre list is split, which columns get which role, and the
//! switches that the dashboard variants disagreed on (skew-gated outliers,
//! upper-triangle heatmap masking).

use crate::error::{EdaError, Result};
use crate::types::ColumnKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the token in derived indicator column names.
pub const TOKEN_PLACEHOLDER: &str = "{token}";

const DEFAULT_TOP_N: usize = 10;
const DEFAULT_SKEW_THRESHOLD: f64 = 1.5;
const DEFAULT_HISTOGRAM_BINS: usize = 24;
const DEFAULT_PREVIEW_ROWS: usize = 10;
const DEFAULT_SAMPLE_SIZE: usize = 100;
const DEFAULT_MULTI_VALUED_RATIO: f64 = 0.1;
const DEFAULT_MAX_TOKEN_LENGTH: usize = 40;

/// Which numeric columns the outlier test runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMode {
    /// Test every numeric column
    #[default]
    Unconditional,
    /// Only test columns whose |skewness| exceeds `skew_threshold`
    SkewGated,
}

/// Configuration for an analysis session.
///
/// Use [`EdaConfig::builder()`] for a validated configuration, or
/// [`EdaConfig::from_json_file`] to load one from disk. Missing JSON fields
/// fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdaConfig {
    /// Location of the delimited input file.
    pub data_path: Option<PathBuf>,

    /// Field delimiter of the input file.
    /// Default: ','
    pub delimiter: char,

    /// Designated multi-valued column expanded into indicator columns.
    /// Default: "Genre"
    pub genre_column: Option<String>,

    /// Separator between tokens of a multi-valued cell. Whitespace after
    /// the separator is ignored.
    /// Default: ","
    pub list_delimiter: String,

    /// Name template for derived indicator columns, must contain `{token}`.
    /// Default: "Genre-{token}"
    pub genre_column_template: String,

    /// Explicit column roles; these win over every heuristic.
    pub column_overrides: BTreeMap<String, ColumnKind>,

    /// Number of non-null values sampled when looking for list-like text.
    /// Default: 100
    pub classifier_sample_size: usize,

    /// Minimum share of list-like samples for a text column to be
    /// classified multi-valued (0.0 - 1.0).
    /// Default: 0.1
    pub multi_valued_min_ratio: f64,

    /// Longest token a list-like value may contain. Prose with commas
    /// produces long tokens and stays categorical.
    /// Default: 40
    pub max_list_token_length: usize,

    /// Categorical columns shown in the univariate section. `None` means
    /// every categorical column except the derived indicators.
    pub categorical_columns: Option<Vec<String>>,

    /// Dimensions truncated to the `top_n` most frequent groups.
    /// Default: ["Director", "Writer"]
    pub high_cardinality_columns: Vec<String>,

    /// Number of groups kept for high-cardinality dimensions.
    /// Default: 10
    pub top_n: usize,

    /// Selectable score metrics for the grouped bar charts.
    pub score_metrics: Vec<String>,

    /// Dimensions broken down by the selected score metric.
    pub score_dimensions: Vec<String>,

    /// Outlier test policy.
    /// Default: Unconditional
    pub outlier_mode: OutlierMode,

    /// Skewness magnitude above which a column is tested in skew-gated mode.
    /// Default: 1.5
    pub skew_threshold: f64,

    /// Numeric columns left out of the correlation matrix and scatter plots.
    pub correlation_exclude: Vec<String>,

    /// Mask the upper triangle (diagonal included) of the heatmap view.
    /// Default: true
    pub mask_upper_triangle: bool,

    /// Number of equal-width histogram bins per numeric column.
    /// Default: 24
    pub histogram_bins: usize,

    /// Number of leading rows included in the report preview.
    /// Default: 10
    pub preview_rows: usize,
}

fn default_score_metrics() -> Vec<String> {
    [
        "Hidden Gem Score",
        "IMDb Score",
        "Rotten Tomatoes Score",
        "Metacritic Score",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_score_dimensions() -> Vec<String> {
    [
        "Series or Movie",
        "Runtime",
        "View Rating",
        "Genre",
        "Director",
        "Writer",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_high_cardinality_columns() -> Vec<String> {
    vec!["Director".to_string(), "Writer".to_string()]
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            delimiter: ',',
            genre_column: Some("Genre".to_string()),
            list_delimiter: ",".to_string(),
            genre_column_template: format!("Genre-{TOKEN_PLACEHOLDER}"),
            column_overrides: BTreeMap::new(),
            classifier_sample_size: DEFAULT_SAMPLE_SIZE,
            multi_valued_min_ratio: DEFAULT_MULTI_VALUED_RATIO,
            max_list_token_length: DEFAULT_MAX_TOKEN_LENGTH,
            categorical_columns: None,
            high_cardinality_columns: default_high_cardinality_columns(),
            top_n: DEFAULT_TOP_N,
            score_metrics: default_score_metrics(),
            score_dimensions: default_score_dimensions(),
            outlier_mode: OutlierMode::default(),
            skew_threshold: DEFAULT_SKEW_THRESHOLD,
            correlation_exclude: Vec::new(),
            mask_upper_triangle: true,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl EdaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder::default()
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EdaError::Io(e).with_context(format!("Reading config {}", path.display()))
        })?;
        let config: EdaConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter));
        }

        if self.list_delimiter.trim().is_empty() {
            return Err(ConfigValidationError::EmptyListDelimiter);
        }

        if !self.genre_column_template.contains(TOKEN_PLACEHOLDER) {
            return Err(ConfigValidationError::InvalidTemplate(
                self.genre_column_template.clone(),
            ));
        }

        for (field, value) in [
            ("top_n", self.top_n),
            ("histogram_bins", self.histogram_bins),
            ("classifier_sample_size", self.classifier_sample_size),
            ("max_list_token_length", self.max_list_token_length),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroCount {
                    field: field.to_string(),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.multi_valued_min_ratio) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "multi_valued_min_ratio".to_string(),
                value: self.multi_valued_min_ratio,
            });
        }

        if !self.skew_threshold.is_finite() || self.skew_threshold < 0.0 {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "skew_threshold".to_string(),
                value: self.skew_threshold,
            });
        }

        Ok(())
    }

    /// Name of the derived indicator column for a token.
    pub fn indicator_column_name(&self, token: &str) -> String {
        self.genre_column_template.replace(TOKEN_PLACEHOLDER, token)
    }

    /// Whether a dimension is truncated to the top `top_n` groups.
    pub fn is_high_cardinality(&self, column: &str) -> bool {
        self.high_cardinality_columns.iter().any(|c| c == column)
    }

    /// Delimiter as the single byte expected by the CSV readers.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value}")]
    InvalidThreshold { field: String, value: f64 },

    #[error("'{field}' must be at least 1")]
    ZeroCount { field: String },

    #[error("Invalid delimiter {0:?} (must be a single ASCII character other than '\"')")]
    InvalidDelimiter(char),

    #[error("List delimiter must contain a non-whitespace character")]
    EmptyListDelimiter,

    #[error("Indicator column template '{0}' must contain '{{token}}'")]
    InvalidTemplate(String),
}

/// Builder for [`EdaConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EdaConfigBuilder {
    data_path: Option<PathBuf>,
    delimiter: Option<char>,
    genre_column: Option<Option<String>>,
    list_delimiter: Option<String>,
    genre_column_template: Option<String>,
    column_overrides: BTreeMap<String, ColumnKind>,
    classifier_sample_size: Option<usize>,
    multi_valued_min_ratio: Option<f64>,
    max_list_token_length: Option<usize>,
    categorical_columns: Option<Vec<String>>,
    high_cardinality_columns: Option<Vec<String>>,
    top_n: Option<usize>,
    score_metrics: Option<Vec<String>>,
    score_dimensions: Option<Vec<String>>,
    outlier_mode: Option<OutlierMode>,
    skew_threshold: Option<f64>,
    correlation_exclude: Option<Vec<String>>,
    mask_upper_triangle: Option<bool>,
    histogram_bins: Option<usize>,
    preview_rows: Option<usize>,
}

fn owned(items: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

impl EdaConfigBuilder {
    /// Set the input file location.
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Set the field delimiter of the input file.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the designated multi-valued column that gets indicator columns.
    pub fn genre_column(mut self, column: impl Into<String>) -> Self {
        self.genre_column = Some(Some(column.into()));
        self
    }

    /// Disable indicator expansion entirely.
    pub fn no_genre_column(mut self) -> Self {
        self.genre_column = Some(None);
        self
    }

    /// Set the separator between tokens of a multi-valued cell.
    pub fn list_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.list_delimiter = Some(delimiter.into());
        self
    }

    /// Set the indicator column name template (must contain `{token}`).
    pub fn genre_column_template(mut self, template: impl Into<String>) -> Self {
        self.genre_column_template = Some(template.into());
        self
    }

    /// Force the role of a column.
    pub fn column_override(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.column_overrides.insert(column.into(), kind);
        self
    }

    /// Set how many values the classifier samples per text column.
    pub fn classifier_sample_size(mut self, size: usize) -> Self {
        self.classifier_sample_size = Some(size);
        self
    }

    /// Set the minimum share of list-like samples for multi-valued columns.
    pub fn multi_valued_min_ratio(mut self, ratio: f64) -> Self {
        self.multi_valued_min_ratio = Some(ratio);
        self
    }

    /// Set the longest token a list-like value may contain.
    pub fn max_list_token_length(mut self, length: usize) -> Self {
        self.max_list_token_length = Some(length);
        self
    }

    /// Restrict the univariate categorical section to these columns.
    pub fn categorical_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categorical_columns = Some(owned(columns));
        self
    }

    /// Set the dimensions truncated to the top `top_n` groups.
    pub fn high_cardinality_columns(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.high_cardinality_columns = Some(owned(columns));
        self
    }

    /// Set the number of groups kept for high-cardinality dimensions.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the selectable score metrics.
    pub fn score_metrics(mut self, metrics: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.score_metrics = Some(owned(metrics));
        self
    }

    /// Set the dimensions broken down by the selected score metric.
    pub fn score_dimensions(
        mut self,
        dimensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.score_dimensions = Some(owned(dimensions));
        self
    }

    /// Set the outlier test policy.
    pub fn outlier_mode(mut self, mode: OutlierMode) -> Self {
        self.outlier_mode = Some(mode);
        self
    }

    /// Set the skewness threshold used in skew-gated mode.
    pub fn skew_threshold(mut self, threshold: f64) -> Self {
        self.skew_threshold = Some(threshold);
        self
    }

    /// Leave these numeric columns out of the correlation matrix.
    pub fn correlation_exclude(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.correlation_exclude = Some(owned(columns));
        self
    }

    /// Enable or disable upper-triangle masking of the heatmap view.
    pub fn mask_upper_triangle(mut self, mask: bool) -> Self {
        self.mask_upper_triangle = Some(mask);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the number of preview rows in the report.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `EdaConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<EdaConfig, ConfigValidationError> {
        let config = EdaConfig {
            data_path: self.data_path,
            delimiter: self.delimiter.unwrap_or(','),
            genre_column: self
                .genre_column
                .unwrap_or_else(|| Some("Genre".to_string())),
            list_delimiter: self.list_delimiter.unwrap_or_else(|| ",".to_string()),
            genre_column_template: self
                .genre_column_template
                .unwrap_or_else(|| format!("Genre-{TOKEN_PLACEHOLDER}")),
            column_overrides: self.column_overrides,
            classifier_sample_size: self.classifier_sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE),
            multi_valued_min_ratio: self
                .multi_valued_min_ratio
                .unwrap_or(DEFAULT_MULTI_VALUED_RATIO),
            max_list_token_length: self
                .max_list_token_length
                .unwrap_or(DEFAULT_MAX_TOKEN_LENGTH),
            categorical_columns: self.categorical_columns,
            high_cardinality_columns: self
                .high_cardinality_columns
                .unwrap_or_else(default_high_cardinality_columns),
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
            score_metrics: self.score_metrics.unwrap_or_else(default_score_metrics),
            score_dimensions: self
                .score_dimensions
                .unwrap_or_else(default_score_dimensions),
            outlier_mode: self.outlier_mode.unwrap_or_default(),
            skew_threshold: self.skew_threshold.unwrap_or(DEFAULT_SKEW_THRESHOLD),
            correlation_exclude: self.correlation_exclude.unwrap_or_default(),
            mask_upper_triangle: self.mask_upper_triangle.unwrap_or(true),
            histogram_bins: self.histogram_bins.unwrap_or(DEFAULT_HISTOGRAM_BINS),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
        };

        config.validate()?;
        Ok(config)
    }
}
