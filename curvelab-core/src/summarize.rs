//! Scalar reductions for bar and box comparisons.

use crate::domain::{RunSeries, ScalarSummary};
use crate::outcome::{Absence, Outcome};

/// Maximum of the run's value sequence.
///
/// The loader never produces an empty series, but a hand-built one is legal,
/// so emptiness signals [`Absence`] rather than panicking.
pub fn max_scalar(run: &RunSeries) -> Outcome<f64> {
    match run.values().iter().copied().reduce(f64::max) {
        Some(max) => Outcome::Ready(max),
        None => Outcome::Absent(Absence::NoRows),
    }
}

/// Mean, population std, and count over per-run scalars.
///
/// An empty input is [`Absence`], never `{mean: 0, …}`: zero is a legitimate
/// performance value and must stay distinguishable from "no data".
pub fn reduce_scalars(scalars: &[f64]) -> Outcome<ScalarSummary> {
    if scalars.is_empty() {
        return Outcome::Absent(Absence::NoScalars);
    }
    let mean = mean_of(scalars);
    Outcome::Ready(ScalarSummary {
        per_run_scalars: scalars.to_vec(),
        mean,
        std: population_std(scalars, mean),
    })
}

fn mean_of(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with divisor N, the convention used throughout the
/// engine (curve shading and bar error bars must agree).
fn population_std(values: &[f64], mean: f64) -> f64 {
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::clean_pairs;

    #[test]
    fn max_scalar_of_series() {
        let run = clean_pairs(vec![(0.0, 1.0), (1.0, 5.0), (2.0, 3.0)])
            .ready()
            .unwrap();
        assert_eq!(max_scalar(&run), Outcome::Ready(5.0));
    }

    #[test]
    fn max_scalar_of_empty_is_absent() {
        let run = RunSeries::new(vec![], vec![]).unwrap();
        assert_eq!(max_scalar(&run).absence(), Some(Absence::NoRows));
    }

    #[test]
    fn max_scalar_of_negative_values() {
        let run = clean_pairs(vec![(0.0, -3.0), (1.0, -1.0)]).ready().unwrap();
        assert_eq!(max_scalar(&run), Outcome::Ready(-1.0));
    }

    #[test]
    fn reduce_uses_population_std() {
        // Population std of {2, 4} is 1, sample std would be sqrt(2).
        let summary = reduce_scalars(&[2.0, 4.0]).ready().unwrap();
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.std, 1.0);
        assert_eq!(summary.count(), 2);
    }

    #[test]
    fn reduce_single_scalar_has_zero_std() {
        let summary = reduce_scalars(&[7.5]).ready().unwrap();
        assert_eq!(summary.mean, 7.5);
        assert_eq!(summary.std, 0.0);
    }

    #[test]
    fn reduce_empty_is_absent_not_zero() {
        assert_eq!(reduce_scalars(&[]).absence(), Some(Absence::NoScalars));
    }

    #[test]
    fn reduce_of_zeros_is_ready() {
        // A legitimate all-zero result is NOT "no data".
        let summary = reduce_scalars(&[0.0, 0.0]).ready().unwrap();
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.count(), 2);
    }
}
