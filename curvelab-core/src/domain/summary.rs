//! Per-condition scalar reductions for bar and box views.

use serde::{Deserialize, Serialize};

/// Scalar statistics over one condition's runs.
///
/// Produced by [`reduce_scalars`](crate::summarize::reduce_scalars); `std` is
/// the population standard deviation, matching the aggregator's convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarSummary {
    /// One scalar per run, in input order.
    pub per_run_scalars: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl ScalarSummary {
    pub fn count(&self) -> usize {
        self.per_run_scalars.len()
    }
}
