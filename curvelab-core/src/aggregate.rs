//! Axis alignment and cross-run aggregation.
//!
//! The union of every run's steps forms the common axis. Each run is
//! reindexed onto it: exact steps keep their sampled value, interior gaps
//! interpolate linearly between that run's surrounding samples, and positions
//! outside a run's coverage take the nearest edge value (no extrapolation
//! along the trend). After edge fill a non-empty run is defined on the whole
//! axis, so an axis position survives exactly when at least one run is
//! non-empty.

use crate::domain::{ConditionAggregate, RunSeries};
use crate::outcome::{Absence, Outcome};
use std::cmp::Ordering;

/// Merge one condition's runs into mean/std curves on the shared step axis.
///
/// `stds` are population standard deviations (divide by N) over the runs
/// defined at each position. Empty input or fewer than `min_runs`
/// contributing runs signal [`Absence`]. Deterministic and invariant to the
/// order of `runs`.
pub fn aggregate(runs: &[RunSeries], min_runs: usize) -> Outcome<ConditionAggregate> {
    if runs.is_empty() {
        return Outcome::Absent(Absence::NoRuns);
    }

    let axis = union_axis(runs);
    let columns: Vec<Vec<f64>> = runs
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| reindex(r, &axis))
        .collect();

    let contributing = columns.len();
    if contributing == 0 {
        return Outcome::Absent(Absence::NoRuns);
    }
    if contributing < min_runs {
        return Outcome::Absent(Absence::BelowMinRuns {
            required: min_runs,
            found: contributing,
        });
    }

    let n = contributing as f64;
    let mut means = Vec::with_capacity(axis.len());
    let mut stds = Vec::with_capacity(axis.len());
    for i in 0..axis.len() {
        let mean = columns.iter().map(|c| c[i]).sum::<f64>() / n;
        let std = if contributing == 1 {
            0.0
        } else {
            let var = columns
                .iter()
                .map(|c| {
                    let d = c[i] - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            var.sqrt()
        };
        means.push(mean);
        stds.push(std);
    }

    Outcome::Ready(ConditionAggregate {
        steps: axis,
        means,
        stds,
        run_count: contributing,
    })
}

/// Sorted union of all distinct step values. f64 has no total order, so this
/// is sort + dedup rather than an ordered set; steps are finite by
/// construction.
fn union_axis(runs: &[RunSeries]) -> Vec<f64> {
    let mut axis: Vec<f64> = runs
        .iter()
        .flat_map(|r| r.steps().iter().copied())
        .collect();
    axis.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    axis.dedup();
    axis
}

/// Reindex one non-empty run onto the common axis.
///
/// Single forward pass: `hi` tracks the first run step ≥ the axis step, so
/// the whole reindex is O(axis + run).
fn reindex(run: &RunSeries, axis: &[f64]) -> Vec<f64> {
    let steps = run.steps();
    let values = run.values();
    let mut out = Vec::with_capacity(axis.len());
    let mut hi = 0usize;

    for &x in axis {
        while hi < steps.len() && steps[hi] < x {
            hi += 1;
        }
        let v = if hi == 0 {
            // At or before the run's first sample.
            values[0]
        } else if hi == steps.len() {
            // Past the run's last sample.
            values[values.len() - 1]
        } else if steps[hi] == x {
            values[hi]
        } else {
            let (x0, y0) = (steps[hi - 1], values[hi - 1]);
            let (x1, y1) = (steps[hi], values[hi]);
            y0 + (y1 - y0) * (x - x0) / (x1 - x0)
        };
        out.push(v);
    }
    out
}
