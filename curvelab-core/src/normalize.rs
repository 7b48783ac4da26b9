//! Series normalization: raw table → cleaned [`RunSeries`].
//!
//! Cleaning policy, in order: coerce both columns to f64 dropping rows that
//! fail on either side, sort ascending by step, and collapse duplicate steps
//! keeping the FIRST occurrence in source order. The first-wins rule is a
//! deliberate simplification, not a statistical merge; downstream numbers
//! depend on it, so it must not be "improved" to averaging.

use crate::columns::ColumnMatcher;
use crate::domain::RunSeries;
use crate::outcome::{Absence, Outcome};
use crate::table::RawTable;
use std::cmp::Ordering;

/// Identify the step/value columns with `matcher`, then clean.
///
/// An unidentifiable column pair is an [`Absence`], not an error: the
/// condition simply loses this run.
pub fn normalize(table: &RawTable, matcher: &ColumnMatcher) -> Outcome<RunSeries> {
    let step_col = match matcher.find_step(table.headers()) {
        Some(name) => name,
        None => return Outcome::Absent(Absence::ColumnsNotFound),
    };
    let value_col = match matcher.find_value(table.headers()) {
        Some(name) => name,
        None => return Outcome::Absent(Absence::ColumnsNotFound),
    };
    normalize_columns(table, step_col, value_col)
}

/// Clean two explicitly named columns into a [`RunSeries`].
pub fn normalize_columns(table: &RawTable, step_col: &str, value_col: &str) -> Outcome<RunSeries> {
    let (steps, values) = match (table.column(step_col), table.column(value_col)) {
        (Some(s), Some(v)) => (s, v),
        _ => return Outcome::Absent(Absence::ColumnsNotFound),
    };

    let mut pairs = Vec::with_capacity(steps.len());
    for (step, value) in steps.iter().zip(values) {
        if let (Ok(s), Ok(v)) = (step.trim().parse::<f64>(), value.trim().parse::<f64>()) {
            pairs.push((s, v));
        }
    }
    clean_pairs(pairs)
}

/// Sort ascending by step and collapse duplicates, first occurrence wins.
///
/// Also the entry point for pre-partitioned `(step, value)` sequences such as
/// a metric-store query. Non-finite pairs are dropped.
pub fn clean_pairs(mut pairs: Vec<(f64, f64)>) -> Outcome<RunSeries> {
    pairs.retain(|(s, v)| s.is_finite() && v.is_finite());
    // Stable sort: equal steps keep source order, so dedup keeps the first
    // occurrence as it appeared in the source.
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    pairs.dedup_by(|next, kept| next.0 == kept.0);

    if pairs.is_empty() {
        return Outcome::Absent(Absence::NoRows);
    }

    let (steps, values) = pairs.into_iter().unzip();
    Outcome::Ready(RunSeries::from_clean(steps, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawTable;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut t = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().copied());
        }
        t
    }

    #[test]
    fn cleans_and_sorts() {
        let t = table(
            &["Step", "Value"],
            &[&["10", "3.0"], &["0", "1.0"], &["5", "2.0"]],
        );
        let series = normalize(&t, &ColumnMatcher::default()).ready().unwrap();

        assert_eq!(series.steps(), &[0.0, 5.0, 10.0]);
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn drops_unparseable_rows() {
        let t = table(
            &["Step", "Value"],
            &[&["0", "1.0"], &["oops", "2.0"], &["2", "n/a"], &["3", "4.0"]],
        );
        let series = normalize(&t, &ColumnMatcher::default()).ready().unwrap();

        assert_eq!(series.steps(), &[0.0, 3.0]);
        assert_eq!(series.values(), &[1.0, 4.0]);
    }

    #[test]
    fn duplicate_steps_keep_first_in_source_order() {
        let t = table(
            &["Step", "Value"],
            &[&["1", "100.0"], &["1", "200.0"], &["0", "5.0"]],
        );
        let series = normalize(&t, &ColumnMatcher::default()).ready().unwrap();

        assert_eq!(series.steps(), &[0.0, 1.0]);
        assert_eq!(series.values(), &[5.0, 100.0]);
    }

    #[test]
    fn missing_columns_signal_absent() {
        let t = table(&["foo", "bar"], &[&["1", "2"]]);
        assert_eq!(
            normalize(&t, &ColumnMatcher::default()).absence(),
            Some(Absence::ColumnsNotFound)
        );
    }

    #[test]
    fn all_rows_bad_signals_no_rows() {
        let t = table(&["Step", "Value"], &[&["x", "y"], &["", ""]]);
        assert_eq!(
            normalize(&t, &ColumnMatcher::default()).absence(),
            Some(Absence::NoRows)
        );
    }

    #[test]
    fn nan_literals_are_dropped() {
        let t = table(&["Step", "Value"], &[&["0", "NaN"], &["1", "2.0"]]);
        let series = normalize(&t, &ColumnMatcher::default()).ready().unwrap();
        assert_eq!(series.steps(), &[1.0]);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let first = clean_pairs(vec![(3.0, 1.0), (1.0, 2.0), (3.0, 9.0), (2.0, 4.0)])
            .ready()
            .unwrap();
        let again = clean_pairs(
            first
                .steps()
                .iter()
                .copied()
                .zip(first.values().iter().copied())
                .collect(),
        )
        .ready()
        .unwrap();

        assert_eq!(first, again);
    }

    #[test]
    fn explicit_column_names_bypass_matching() {
        let t = table(&["gen", "fit"], &[&["0", "1.0"], &["1", "2.0"]]);
        let series = normalize_columns(&t, "gen", "fit").ready().unwrap();
        assert_eq!(series.len(), 2);

        assert_eq!(
            normalize_columns(&t, "gen", "nope").absence(),
            Some(Absence::ColumnsNotFound)
        );
    }
}
