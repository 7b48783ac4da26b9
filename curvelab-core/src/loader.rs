//! Batch loading of one condition's runs.
//!
//! One condition directory holds one CSV per run. A file that cannot be read
//! or yields no usable series is recorded and skipped; a single bad run never
//! fails the condition.

use crate::aggregate::aggregate;
use crate::columns::ColumnMatcher;
use crate::domain::{ConditionAggregate, RunSeries};
use crate::ingest::{self, LoadError};
use crate::normalize::normalize;
use crate::outcome::{Absence, Outcome};
use crate::summarize::max_scalar;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Why a source file contributed no run.
#[derive(Debug)]
pub enum SkipCause {
    /// The file could not be read or parsed as CSV.
    Load(LoadError),
    /// The file was readable but yielded no series.
    Absent(Absence),
}

/// One skipped source with its reason, for caller-side diagnostics.
#[derive(Debug)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub cause: SkipCause,
}

impl fmt::Display for SkippedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            SkipCause::Load(e) => write!(f, "{}: {e}", self.path.display()),
            SkipCause::Absent(a) => write!(f, "{}: {a}", self.path.display()),
        }
    }
}

/// A condition directory's loaded runs plus per-file diagnostics.
#[derive(Debug)]
pub struct LoadedRuns {
    pub runs: Vec<RunSeries>,
    pub skipped: Vec<SkippedSource>,
}

/// Load every CSV under `dir` through the column matcher.
pub fn load_runs(dir: &Path, matcher: &ColumnMatcher) -> LoadedRuns {
    let mut runs = Vec::new();
    let mut skipped = Vec::new();

    for path in csv_files(dir) {
        match ingest::read_csv(&path) {
            Err(e) => skipped.push(SkippedSource {
                path,
                cause: SkipCause::Load(e),
            }),
            Ok(table) => match normalize(&table, matcher) {
                Outcome::Ready(run) => runs.push(run),
                Outcome::Absent(a) => skipped.push(SkippedSource {
                    path,
                    cause: SkipCause::Absent(a),
                }),
            },
        }
    }

    LoadedRuns { runs, skipped }
}

/// Load and aggregate a condition directory in one call.
pub fn aggregate_dir(
    dir: &Path,
    matcher: &ColumnMatcher,
    min_runs: usize,
) -> (Outcome<ConditionAggregate>, Vec<SkippedSource>) {
    let loaded = load_runs(dir, matcher);
    (aggregate(&loaded.runs, min_runs), loaded.skipped)
}

/// Per-run maximum values for a condition directory, for bar/box views.
pub fn max_scores(dir: &Path, matcher: &ColumnMatcher) -> (Vec<f64>, Vec<SkippedSource>) {
    let loaded = load_runs(dir, matcher);
    let scores = loaded
        .runs
        .iter()
        .filter_map(|run| max_scalar(run).ready())
        .collect();
    (scores, loaded.skipped)
}

/// CSV files directly under `dir`, sorted by name so diagnostics are stable.
/// Run order does not matter downstream: aggregation is order-invariant.
fn csv_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("csv"))
        .collect();
    files.sort();
    files
}
