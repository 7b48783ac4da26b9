//! CSV export and chart artifact bundles.
//!
//! Two surfaces:
//! - **Per-run pivoted CSVs**: one file per run, `Step` column plus one
//!   `{project} - {metric}` column per metric, blank cells where a metric
//!   was not logged at a step. The shape foreign tools (and our own
//!   ingest path) expect.
//! - **Chart artifacts**: a timestamped directory holding `manifest.json`
//!   (the serialized chart), a wide data CSV, and `report.md`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::charts::{Chart, ChartData};
use crate::report::chart_report;
use crate::store::MetricStore;

// ─── Per-run pivoted CSVs ───────────────────────────────────────────

/// Write one pivoted CSV per run of `project` into `out_dir`. Returns the
/// written paths. Runs with no logged metrics are skipped.
pub fn export_runs_csv(
    store: &MetricStore,
    project: &str,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create export dir: {}", out_dir.display()))?;

    let mut written = Vec::new();
    for run in store.runs(project)? {
        let metrics = store.run_metrics(project, &run)?;
        if metrics.is_empty() {
            continue;
        }

        // Union of steps across the run's metrics, with first-wins cells.
        let mut columns: Vec<HashMap<i64, f64>> = Vec::with_capacity(metrics.len());
        let mut steps: Vec<i64> = Vec::new();
        for metric in &metrics {
            let mut cells = HashMap::new();
            for (step, value) in store.series_by_step(project, &run, metric)? {
                cells.entry(step).or_insert(value);
                steps.push(step);
            }
            columns.push(cells);
        }
        steps.sort_unstable();
        steps.dedup();

        let path = out_dir.join(format!("{run}.csv"));
        let mut wtr = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut header = vec!["Step".to_string()];
        header.extend(metrics.iter().map(|m| format!("{project} - {m}")));
        wtr.write_record(&header)?;

        for step in steps {
            let mut record = vec![step.to_string()];
            for cells in &columns {
                record.push(cells.get(&step).map(|v| v.to_string()).unwrap_or_default());
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        written.push(path);
    }
    Ok(written)
}

// ─── Chart artifacts ────────────────────────────────────────────────

/// Save a chart's artifact set under `out_dir`.
///
/// Creates `{name}_{yyyymmdd_hhmmss}/` containing `manifest.json`, a wide
/// data CSV (`curves.csv`, `bars.csv`, or `box.csv` by mode), and
/// `report.md`. Returns the created directory.
pub fn save_chart_artifacts(chart: &Chart, name: &str, out_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("{name}_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = out_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let manifest =
        serde_json::to_string_pretty(chart).context("failed to serialize chart manifest")?;
    std::fs::write(run_dir.join("manifest.json"), manifest)?;

    let csv_name = match chart.data {
        ChartData::Curves { .. } => "curves.csv",
        ChartData::Bars { .. } => "bars.csv",
        ChartData::Box { .. } => "box.csv",
    };
    std::fs::write(run_dir.join(csv_name), chart_csv(chart)?)?;

    std::fs::write(run_dir.join("report.md"), chart_report(chart))?;

    Ok(run_dir)
}

/// Render a chart's data as CSV: wide per-condition mean/std columns for
/// curves, one row per condition for bars, one row per run for box.
pub fn chart_csv(chart: &Chart) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    match &chart.data {
        ChartData::Curves { series } => {
            let mut header = vec!["Step".to_string()];
            for s in series {
                header.push(format!("{} mean", s.label));
                header.push(format!("{} std", s.label));
            }
            wtr.write_record(&header)?;

            // Union axis across conditions; one ascending cursor per series
            // fills its cells, blanks where a condition has no value.
            let mut axis: Vec<f64> = series.iter().flat_map(|s| s.steps.iter().copied()).collect();
            axis.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            axis.dedup();

            let mut cursors = vec![0usize; series.len()];
            for step in axis {
                let mut record = vec![step.to_string()];
                for (s, cursor) in series.iter().zip(&mut cursors) {
                    if *cursor < s.steps.len() && s.steps[*cursor] == step {
                        record.push(s.means[*cursor].to_string());
                        record.push(s.stds[*cursor].to_string());
                        *cursor += 1;
                    } else {
                        record.push(String::new());
                        record.push(String::new());
                    }
                }
                wtr.write_record(&record)?;
            }
        }
        ChartData::Bars { entries } => {
            wtr.write_record(["Condition", "Mean", "Std", "Runs"])?;
            for e in entries {
                wtr.write_record([
                    e.label.as_str(),
                    &e.mean.to_string(),
                    &e.std.to_string(),
                    &e.run_count.to_string(),
                ])?;
            }
        }
        ChartData::Box { entries } => {
            wtr.write_record(["Condition", "Run", "Score"])?;
            for e in entries {
                for (i, score) in e.scores.iter().enumerate() {
                    wtr.write_record([e.label.as_str(), &i.to_string(), &score.to_string()])?;
                }
            }
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{store_chart, ChartMode, ChartOptions};
    use crate::session::RunOptions;
    use tempfile::TempDir;

    fn seeded_store() -> (TempDir, MetricStore) {
        let dir = TempDir::new().unwrap();
        let store = MetricStore::open(dir.path().join("metrics.db")).unwrap();
        let mut s = store.begin_run("proj", RunOptions::named("r0")).unwrap();
        s.log(&[("loss", 3.0), ("accuracy", 0.1)]).unwrap();
        s.log(&[("loss", 2.0)]).unwrap();
        s.log(&[("loss", 1.0), ("accuracy", 0.9)]).unwrap();
        s.finish().unwrap();
        (dir, store)
    }

    #[test]
    fn pivoted_export_has_blank_cells_for_missing_steps() {
        let (dir, store) = seeded_store();
        let out = dir.path().join("export");
        let written = export_runs_csv(&store, "proj", &out).unwrap();
        assert_eq!(written.len(), 1);

        let text = std::fs::read_to_string(&written[0]).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "Step,proj - accuracy,proj - loss");
        assert_eq!(lines.next().unwrap(), "0,0.1,3");
        // accuracy was not logged at step 1.
        assert_eq!(lines.next().unwrap(), "1,,2");
        assert_eq!(lines.next().unwrap(), "2,0.9,1");
    }

    #[test]
    fn artifact_bundle_is_complete() {
        let (dir, store) = seeded_store();
        let chart = store_chart(
            &store,
            &["proj"],
            "loss",
            None,
            ChartMode::Curves,
            &ChartOptions::default(),
        )
        .unwrap();

        let run_dir = save_chart_artifacts(&chart, "loss", dir.path().join("plots").as_path())
            .unwrap();
        assert!(run_dir.join("manifest.json").exists());
        assert!(run_dir.join("curves.csv").exists());
        assert!(run_dir.join("report.md").exists());

        let manifest = std::fs::read_to_string(run_dir.join("manifest.json")).unwrap();
        let back: Chart = serde_json::from_str(&manifest).unwrap();
        assert_eq!(back, chart);
    }

    #[test]
    fn curves_csv_is_wide() {
        let (_dir, store) = seeded_store();
        let chart = store_chart(
            &store,
            &["proj"],
            "loss",
            None,
            ChartMode::Curves,
            &ChartOptions::default(),
        )
        .unwrap();

        let csv = chart_csv(&chart).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "Step,proj mean,proj std");
        assert_eq!(lines.next().unwrap(), "0,3,0");
    }

    #[test]
    fn bars_csv_is_one_row_per_condition() {
        let (_dir, store) = seeded_store();
        let chart = store_chart(
            &store,
            &["proj"],
            "loss",
            None,
            ChartMode::Bars,
            &ChartOptions::default(),
        )
        .unwrap();

        let csv = chart_csv(&chart).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "Condition,Mean,Std,Runs");
        assert_eq!(lines.next().unwrap(), "proj,3,0,1");
        assert_eq!(lines.next(), None);
    }
}
