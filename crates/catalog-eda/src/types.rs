use crate::config::OutlierMode;
use crate::error::{EdaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Column classification
// ============================================================================

/// Role of a column in the analysis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every non-missing value parses as a number.
    Numeric,
    /// Discrete text tokens (also booleans and free text).
    Categorical,
    /// Delimiter-joined lists of tokens, e.g. a genre list.
    MultiValued,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::MultiValued => "multi_valued",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedColumn {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
}

/// Partition of every dataset column into exactly one [`ColumnKind`],
/// in dataset column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub columns: Vec<ClassifiedColumn>,
}

impl ColumnClassification {
    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.kind)
    }

    /// Column names of one kind, in dataset order.
    pub fn names_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn numeric(&self) -> Vec<String> {
        self.names_of(ColumnKind::Numeric)
    }

    pub fn categorical(&self) -> Vec<String> {
        self.names_of(ColumnKind::Categorical)
    }

    pub fn multi_valued(&self) -> Vec<String> {
        self.names_of(ColumnKind::MultiValued)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Distinct tokens of a multi-valued column, sorted lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreTokenSet {
    pub column: String,
    pub tokens: BTreeSet<String>,
}

impl GenreTokenSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// ============================================================================
// Quality audit
// ============================================================================

/// One line of the column info table (name, type, non-null count).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub non_null_count: usize,
    pub missing_count: usize,
    pub missing_percentage: f64,
}

/// Duplicate and missing-value audit of the dataset.
///
/// `no_duplicates` and `no_missing_values` are explicit flags so a
/// renderer can print "There are no duplicated rows." instead of a zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub row_count: usize,
    pub column_count: usize,
    pub duplicate_count: usize,
    pub no_duplicates: bool,
    pub total_missing_cells: usize,
    /// Number of columns with at least one missing value.
    pub columns_with_missing: usize,
    pub no_missing_values: bool,
    pub columns: Vec<ColumnInfo>,
}

impl QualityReport {
    pub fn missing_count(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.missing_count)
    }
}

// ============================================================================
// Outliers
// ============================================================================

/// Quartiles and the Tukey fences derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl IqrBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutlierStatus {
    /// The IQR test ran on this column.
    Evaluated {
        bounds: IqrBounds,
        has_outliers: bool,
        outlier_count: usize,
        skewness: Option<f64>,
    },
    /// Skew-gated mode left this column untested.
    BelowSkewThreshold { skewness: f64 },
    /// Fewer than 4 non-missing values.
    InsufficientData { available: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    #[serde(flatten)]
    pub status: OutlierStatus,
}

impl ColumnOutliers {
    /// True only when the test ran and found at least one outlier.
    pub fn has_outliers(&self) -> bool {
        matches!(
            self.status,
            OutlierStatus::Evaluated {
                has_outliers: true,
                ..
            }
        )
    }

    pub fn bounds(&self) -> Option<&IqrBounds> {
        match &self.status {
            OutlierStatus::Evaluated { bounds, .. } => Some(bounds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub mode: OutlierMode,
    pub skew_threshold: f64,
    pub columns: Vec<ColumnOutliers>,
}

impl OutlierReport {
    pub fn get(&self, column: &str) -> Option<&ColumnOutliers> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// Columns flagged as having outliers (the box-plot candidates).
    pub fn flagged_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.has_outliers())
            .map(|c| c.column.as_str())
            .collect()
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// One bar of a grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub category: String,
    /// Rows belonging to the group.
    pub count: usize,
    /// Rows of the group with a non-missing metric value.
    pub metric_count: usize,
    /// Mean of the non-missing metric values, `None` if there are none.
    pub mean: Option<f64>,
}

/// Grouped counts and means of a metric by a dimension.
///
/// Groups are ordered by descending count, ties in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub dimension: String,
    pub metric: String,
    pub dimension_kind: ColumnKind,
    pub groups: Vec<GroupAggregate>,
    /// Number of groups before top-N truncation.
    pub distinct_groups: usize,
    pub truncated: bool,
}

impl AggregationResult {
    pub fn group(&self, category: &str) -> Option<&GroupAggregate> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn total_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// One dimension of the score breakdown.
#[derive(Debug, Serialize)]
pub struct DimensionBreakdown {
    pub dimension: String,
    pub outcome: SectionOutcome<AggregationResult>,
}

/// Grouped bar chart data for every score dimension, for one metric.
#[derive(Debug, Serialize)]
pub struct ScoreBreakdown {
    pub metric: String,
    pub dimensions: Vec<DimensionBreakdown>,
}

impl ScoreBreakdown {
    pub fn dimension(&self, dimension: &str) -> Option<&SectionOutcome<AggregationResult>> {
        self.dimensions
            .iter()
            .find(|d| d.dimension == dimension)
            .map(|d| &d.outcome)
    }
}

// ============================================================================
// Correlation
// ============================================================================

/// A correlation matrix cell. Zero-variance inputs are `Undefined`,
/// never coerced to 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationValue {
    Coefficient(f64),
    Undefined,
}

impl CorrelationValue {
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            Self::Coefficient(value) => Some(*value),
            Self::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

/// Square symmetric Pearson correlation matrix over numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<CorrelationValue>>,
}

impl CorrelationMatrix {
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<CorrelationValue> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Heatmap-ready matrix; `None` cells are masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapView {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub cells: Vec<Vec<Option<CorrelationValue>>>,
    pub masked_upper_triangle: bool,
}

// ============================================================================
// Univariate & bivariate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Absent below 3 values.
    pub skewness: Option<f64>,
}

/// Histogram-ready view of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub missing_count: usize,
    /// `None` when the column has no values at all.
    pub stats: Option<DescriptiveStats>,
    /// Non-missing values in row order.
    pub values: Vec<f64>,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

/// Count-plot data for a categorical or multi-valued column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub column: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub entries: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnivariateReport {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<FrequencyTable>,
    pub multi_valued: Vec<FrequencyTable>,
}

impl UnivariateReport {
    pub fn numeric_summary(&self, column: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.column == column)
    }

    pub fn frequency_table(&self, column: &str) -> Option<&FrequencyTable> {
        self.categorical
            .iter()
            .chain(self.multi_valued.iter())
            .find(|t| t.column == column)
    }
}

/// Pairwise-complete points of one scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPair {
    pub x: String,
    pub y: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterMatrix {
    pub columns: Vec<String>,
    pub pairs: Vec<ScatterPair>,
}

impl ScatterMatrix {
    pub fn pair(&self, x: &str, y: &str) -> Option<&ScatterPair> {
        self.pairs.iter().find(|p| p.x == x && p.y == y)
    }
}

// ============================================================================
// Section outcomes
// ============================================================================

/// Result of one independently computed section.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome<T> {
    Ok { data: T },
    Error { error: EdaError },
}

impl<T> SectionOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ok { data } => Some(data),
            Self::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&EdaError> {
        match self {
            Self::Ok { .. } => None,
            Self::Error { error } => Some(error),
        }
    }
}

impl<T> From<Result<T>> for SectionOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Ok { data },
            Err(error) => Self::Error { error },
        }
    }
}
