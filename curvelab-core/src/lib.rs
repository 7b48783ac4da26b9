//! CurveLab Core — run series, axis alignment, cross-run statistics.
//!
//! This crate contains the aggregation engine behind the comparison plots:
//! - Domain types (run series, condition aggregates, scalar summaries, condition sets)
//! - CSV ingestion and ranked-rule column identification for foreign exports
//! - Normalization (numeric coercion, ascending sort, first-wins dedupe)
//! - Union-axis alignment with per-run linear interpolation and edge fill
//! - EMA and Savitzky–Golay smoothing with explicit pass-through signalling
//! - Scalar summaries (per-run max, mean/population-std reduction)
//! - Condition discovery over a directory namespace
//!
//! Everything here is pure and synchronous; "no data" travels as
//! [`Outcome::Absent`], never as an error or a silent zero.

pub mod aggregate;
pub mod columns;
pub mod discover;
pub mod domain;
pub mod ingest;
pub mod loader;
pub mod normalize;
pub mod outcome;
pub mod scale;
pub mod smooth;
pub mod summarize;
pub mod table;

pub use aggregate::aggregate;
pub use columns::{ColumnMatcher, ColumnRule, RuleKind, STEP_RULES, VALUE_RULES};
pub use discover::discover;
pub use domain::{
    Condition, ConditionAggregate, ConditionSet, RunSeries, ScalarSummary, SeriesError,
};
pub use ingest::{read_csv, read_csv_from, LoadError};
pub use loader::{aggregate_dir, load_runs, max_scores, LoadedRuns, SkipCause, SkippedSource};
pub use normalize::{clean_pairs, normalize, normalize_columns};
pub use outcome::{Absence, Outcome};
pub use scale::{rescale, ScaleMethod};
pub use smooth::{ema, savgol, smooth, PassReason, SmoothMethod, Smoothed};
pub use summarize::{max_scalar, reduce_scalars};
pub use table::RawTable;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn domain_types_are_send_sync() {
        assert_send::<RunSeries>();
        assert_sync::<RunSeries>();
        assert_send::<ConditionAggregate>();
        assert_sync::<ConditionAggregate>();
        assert_send::<ScalarSummary>();
        assert_sync::<ScalarSummary>();
        assert_send::<ConditionSet>();
        assert_sync::<ConditionSet>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<Outcome<RunSeries>>();
        assert_sync::<Outcome<RunSeries>>();
        assert_send::<Smoothed>();
        assert_sync::<Smoothed>();
        assert_send::<SkippedSource>();
        assert_sync::<SkippedSource>();
    }

    #[test]
    fn matcher_is_send_sync() {
        // Conditions are aggregated in parallel downstream; the matcher is
        // shared across those workers.
        assert_send::<ColumnMatcher>();
        assert_sync::<ColumnMatcher>();
    }
}
