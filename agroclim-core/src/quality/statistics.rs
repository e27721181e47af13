//! Descriptive statistics over a numeric series.
//!
//! Standard deviation is the sample standard deviation (divides by n-1),
//! and percentiles interpolate linearly between ranked order statistics
//! at rank `p * (n - 1)`.

use serde::{Deserialize, Serialize};

use crate::error::{AgroclimError, Result};

/// Descriptive statistics for one dataset's present values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of values the statistics were computed over
    pub count: u64,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (0.0 for a single value)
    pub std_dev: f64,
    /// 50th percentile
    pub median: f64,
    /// 95th percentile, the extreme-event threshold for rainfall
    pub percentile_95: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl Statistics {
    /// Computes statistics for `values`.
    ///
    /// Non-finite values are ignored. Fails with
    /// [`AgroclimError::InsufficientData`] when nothing finite remains.
    pub fn compute(dataset: &str, values: &[f64]) -> Result<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Err(AgroclimError::insufficient_data(dataset));
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let sum_sq = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (sum_sq / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            count: count as u64,
            mean,
            std_dev,
            median: percentile_sorted(&sorted, 0.5),
            percentile_95: percentile_sorted(&sorted, 0.95),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }

    /// Coefficient of variation (`std_dev / mean`), `None` when the mean is zero.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean.abs() < f64::EPSILON {
            None
        } else {
            Some(self.std_dev / self.mean)
        }
    }
}

/// Returns the `p`-quantile (0.0-1.0) of `values` with linear interpolation.
///
/// Returns `None` for an empty slice. `p` is clamped to [0, 1].
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(percentile_sorted(&sorted, p))
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation, `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

// `sorted` must be non-empty and ascending.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
