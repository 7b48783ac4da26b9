//! A single run's cleaned metric series.

use thiserror::Error;

/// Violations rejected by [`RunSeries::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("steps and values differ in length: {steps} vs {values}")]
    LengthMismatch { steps: usize, values: usize },

    #[error("non-finite number at row {row}")]
    NonFinite { row: usize },

    #[error("steps not strictly increasing at row {row}")]
    NotIncreasing { row: usize },
}

/// One run's cleaned data: a step axis and the metric sampled on it.
///
/// Steps are strictly increasing and unique; values are index-aligned and
/// finite. The checked constructor rejects dirty input; the cleaning path
/// (sort, first-wins dedup, NaN drop) lives in
/// [`clean_pairs`](crate::normalize::clean_pairs).
#[derive(Debug, Clone, PartialEq)]
pub struct RunSeries {
    steps: Vec<f64>,
    values: Vec<f64>,
}

impl RunSeries {
    /// Build a series from already-clean data.
    pub fn new(steps: Vec<f64>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if steps.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                steps: steps.len(),
                values: values.len(),
            });
        }
        for (row, (s, v)) in steps.iter().zip(&values).enumerate() {
            if !s.is_finite() || !v.is_finite() {
                return Err(SeriesError::NonFinite { row });
            }
            if row > 0 && steps[row - 1] >= *s {
                return Err(SeriesError::NotIncreasing { row });
            }
        }
        Ok(Self { steps, values })
    }

    /// Construct without validation. Callers guarantee the invariants hold.
    pub(crate) fn from_clean(steps: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(steps.len(), values.len());
        debug_assert!(steps.windows(2).all(|w| w[0] < w[1]));
        Self { steps, values }
    }

    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
