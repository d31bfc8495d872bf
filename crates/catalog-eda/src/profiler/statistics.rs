//! Descriptive statistics over plain `f64` slices.
//!
//! Values handed to these functions are already stripped of missing
//! entries; callers go through [`crate::utils::numeric_values`] first.

use crate::error::{EdaError, Result};
use crate::types::{CorrelationValue, DescriptiveStats, HistogramBin, IqrBounds};
use anofox_statistics::correlation;

/// Minimum number of non-missing values for the IQR test.
pub const MIN_OUTLIER_VALUES: usize = 4;

/// Tukey fence multiplier.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Sort a copy of the values ascending.
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolation quantile of sorted values (position `q * (n - 1)`).
pub(crate) fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator), 0.0 below two values.
pub(crate) fn calculate_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let mean = mean(values).unwrap_or(0.0);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

/// Adjusted Fisher-Pearson skewness (G1).
///
/// `None` below three values; constant data has skewness 0.
pub(crate) fn calculate_skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }
    let nf = n as f64;
    let mean = mean(values)?;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / nf;
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Quartiles and Tukey fences of a column.
pub(crate) fn iqr_bounds(column: &str, values: &[f64]) -> Result<IqrBounds> {
    if values.len() < MIN_OUTLIER_VALUES {
        return Err(EdaError::InsufficientData {
            column: column.to_string(),
            available: values.len(),
            required: MIN_OUTLIER_VALUES,
        });
    }

    let sorted = sorted(values);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;

    Ok(IqrBounds {
        q1,
        q3,
        iqr,
        lower_bound: q1 - IQR_MULTIPLIER * iqr,
        upper_bound: q3 + IQR_MULTIPLIER * iqr,
    })
}

/// Full descriptive summary, `None` for an empty column.
pub(crate) fn describe(values: &[f64]) -> Option<DescriptiveStats> {
    let mean = mean(values)?;
    let sorted = sorted(values);
    Some(DescriptiveStats {
        mean,
        std_dev: calculate_std(values),
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
        skewness: calculate_skewness(values),
    })
}

/// Equal-width histogram. Constant data collapses to a single bin.
pub(crate) fn build_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let bin_count = bins.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in values {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}

/// Pearson correlation of paired observations.
///
/// Fewer than two pairs or zero variance on either side is `Undefined`.
pub(crate) fn pearson(pairs: &[(f64, f64)]) -> CorrelationValue {
    if pairs.len() < 2 {
        return CorrelationValue::Undefined;
    }

    let (x, y): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
    if is_constant(&x) || is_constant(&y) {
        return CorrelationValue::Undefined;
    }

    // Two distinct points always lie on a line
    if pairs.len() == 2 {
        let slope = (x[1] - x[0]) * (y[1] - y[0]);
        return CorrelationValue::Coefficient(slope.signum());
    }

    match correlation::pearson(&x, &y, None) {
        Ok(result) if result.estimate.is_finite() => {
            CorrelationValue::Coefficient(result.estimate.clamp(-1.0, 1.0))
        }
        _ => CorrelationValue::Undefined,
    }
}

/// Whether the values have nonzero variance.
pub(crate) fn has_variance(values: &[f64]) -> bool {
    values.len() >= 2 && !is_constant(values)
}

/// Every value equal to the first, i.e. exactly zero variance.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==================== quantiles ====================

    #[test]
    fn test_quantile_sorted_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert!(approx(quantile_sorted(&values, 0.25), 2.25));
        assert!(approx(quantile_sorted(&values, 0.5), 3.5));
        assert!(approx(quantile_sorted(&values, 0.75), 4.75));
        assert_eq!(quantile_sorted(&values, 0.0), 1.0);
        assert_eq!(quantile_sorted(&values, 1.0), 100.0);
    }

    #[test]
    fn test_quantile_sorted_empty() {
        assert_eq!(quantile_sorted(&[], 0.5), 0.0);
    }

    // ==================== std / skewness ====================

    #[test]
    fn test_calculate_std_basic() {
        // Variance = 10 / 4 = 2.5
        let std = calculate_std(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(approx(std, 2.5f64.sqrt()));
    }

    #[test]
    fn test_calculate_std_single_value() {
        assert_eq!(calculate_std(&[5.0]), 0.0);
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        let skew = calculate_skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(approx(skew, 0.0));
    }

    #[test]
    fn test_skewness_adjusted_value() {
        // m2 = 8/9, m3 = 16/27 -> g1 = 0.7071, G1 = g1 * sqrt(6) = sqrt(3)
        let skew = calculate_skewness(&[0.0, 0.0, 2.0]).unwrap();
        assert!((skew - 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_skewness_right_tail_positive() {
        let skew = calculate_skewness(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert!(skew > 1.5);
    }

    #[test]
    fn test_skewness_too_few_values() {
        assert_eq!(calculate_skewness(&[1.0, 2.0]), None);
    }

    #[test]
    fn test_skewness_constant_is_zero() {
        assert_eq!(calculate_skewness(&[4.0, 4.0, 4.0, 4.0]), Some(0.0));
    }

    // ==================== IQR ====================

    #[test]
    fn test_iqr_bounds_reference_values() {
        let bounds = iqr_bounds("x", &[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert!(approx(bounds.q1, 2.25));
        assert!(approx(bounds.q3, 4.75));
        assert!(approx(bounds.iqr, 2.5));
        assert!(approx(bounds.lower_bound, -1.5));
        assert!(approx(bounds.upper_bound, 8.5));
        assert!(!bounds.contains(100.0));
    }

    #[test]
    fn test_iqr_bounds_unsorted_input() {
        let bounds = iqr_bounds("x", &[100.0, 3.0, 1.0, 5.0, 2.0, 4.0]).unwrap();
        assert!(approx(bounds.q1, 2.25));
    }

    #[test]
    fn test_iqr_bounds_insufficient() {
        let err = iqr_bounds("Boxoffice", &[1.0, 2.0, 3.0]).unwrap_err();
        match err {
            EdaError::InsufficientData {
                column,
                available,
                required,
            } => {
                assert_eq!(column, "Boxoffice");
                assert_eq!(available, 3);
                assert_eq!(required, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    // ==================== describe / histogram ====================

    #[test]
    fn test_describe() {
        let stats = describe(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.median, 2.0);
        assert!(approx(stats.mean, 2.0));
        assert!(stats.skewness.is_some());
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_build_histogram_counts_all_values() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let bins = build_histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].start, 0.0);
        assert!(approx(bins[4].end, 10.0));
        // Max lands in the last bin
        assert_eq!(bins[4].count, 1);
    }

    #[test]
    fn test_build_histogram_constant_and_empty() {
        let bins = build_histogram(&[7.0, 7.0, 7.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert!(build_histogram(&[], 10).is_empty());
    }

    // ==================== pearson ====================

    #[test]
    fn test_pearson_strong_linear() {
        // cov = 20, var_x = 10, var_y = 41.2 -> r = 20 / sqrt(412)
        let pairs = [(1.0, 2.0), (2.0, 5.0), (3.0, 6.0), (4.0, 9.0), (5.0, 10.0)];
        let r = pearson(&pairs).coefficient().unwrap();
        assert!((r - 20.0 / 412f64.sqrt()).abs() < 1e-6);
        assert!(r <= 1.0);

        let mirrored: Vec<(f64, f64)> = pairs.iter().map(|(x, y)| (*x, -y)).collect();
        let r = pearson(&mirrored).coefficient().unwrap();
        assert!((r + 20.0 / 412f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_pearson_two_pairs() {
        assert_eq!(
            pearson(&[(1.0, 3.0), (2.0, 5.0)]),
            CorrelationValue::Coefficient(1.0)
        );
        assert_eq!(
            pearson(&[(1.0, 5.0), (2.0, 3.0)]),
            CorrelationValue::Coefficient(-1.0)
        );
    }

    #[test]
    fn test_small_magnitude_values_have_variance() {
        let tiny = [1e-7, 2e-7, 3e-7, 4e-7];
        assert!(has_variance(&tiny));

        let skew = calculate_skewness(&[1e-7, 1e-7, 2e-7, 9e-7]).unwrap();
        assert!(skew > 0.5);

        let pairs: Vec<(f64, f64)> = tiny
            .iter()
            .zip([2.0, 1.0, 4.0, 3.0])
            .map(|(x, y)| (*x, y))
            .collect();
        assert!(pearson(&pairs).coefficient().is_some());
    }

    #[test]
    fn test_pearson_undefined_cases() {
        assert!(pearson(&[(1.0, 1.0)]).is_undefined());
        assert!(pearson(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]).is_undefined());
    }

    #[test]
    fn test_has_variance() {
        assert!(has_variance(&[1.0, 2.0]));
        assert!(!has_variance(&[2.0, 2.0]));
        assert!(!has_variance(&[2.0]));
        assert!(has_variance(&[-1e-9, 1e-9]));
    }
}
