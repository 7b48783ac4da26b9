//! Cross-run statistics for one condition.

use serde::{Deserialize, Serialize};

/// Mean/std curves for one condition on a shared step axis.
///
/// Every position was defined in at least one contributing run; `stds[i]` is
/// the population standard deviation over the runs defined there (0 when only
/// one run contributed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionAggregate {
    /// Union of contributing runs' steps, ascending.
    pub steps: Vec<f64>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    /// Runs that contributed at least one valid position.
    pub run_count: usize,
}

impl ConditionAggregate {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drop every position past `max_step`. Steps are ascending, so this is a
    /// prefix cut.
    pub fn truncated(mut self, max_step: f64) -> Self {
        let keep = self.steps.iter().take_while(|s| **s <= max_step).count();
        self.steps.truncate(keep);
        self.means.truncate(keep);
        self.stds.truncate(keep);
        self
    }
}
