//! Markdown reports: per-project summaries and per-chart companions.

use curvelab_core::{aggregate, clean_pairs, Outcome};

use crate::charts::{Chart, ChartData};
use crate::store::{MetricStore, StoreError};

/// Per-metric group statistics for a project, as a Markdown document.
///
/// One table per metric, one row per group (see
/// [`MetricStore::run_groups`]); statistics are computed over the group's
/// aggregate mean curve, population std throughout. Rows are sorted by the
/// final value, best first.
pub fn summary_markdown(
    store: &MetricStore,
    project: &str,
    group_by: Option<&str>,
) -> Result<String, StoreError> {
    let metrics = store.metrics(project)?;
    let groups = store.run_groups(project, group_by)?;

    let mut md = String::with_capacity(2048);
    md.push_str(&format!("# Experiment Summary — {project}\n\n"));
    md.push_str(&format!(
        "Generated: {}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    ));

    for metric in &metrics {
        md.push_str(&format!("## {metric}\n\n"));
        md.push_str("| Group | Final | Mean | Std | Min | Max | Points | Runs |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");

        let mut rows = Vec::new();
        for group in &groups {
            let mut series = Vec::new();
            for run in &group.runs {
                if let Outcome::Ready(s) = clean_pairs(store.series(project, run, metric)?) {
                    series.push(s);
                }
            }
            let Outcome::Ready(agg) = aggregate(&series, 1) else {
                continue;
            };
            rows.push((group.label.clone(), curve_stats(&agg.means), agg.run_count));
        }
        rows.sort_by(|a, b| {
            b.1.final_value
                .partial_cmp(&a.1.final_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for (label, stats, runs) in rows {
            md.push_str(&format!(
                "| {label} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} | {} | {runs} |\n",
                stats.final_value, stats.mean, stats.std, stats.min, stats.max, stats.points
            ));
        }
        md.push('\n');
    }
    Ok(md)
}

/// The Markdown companion written into a chart's artifact directory.
pub fn chart_report(chart: &Chart) -> String {
    let mut md = String::with_capacity(1024);
    md.push_str(&format!("# {}\n\n", chart.title));

    match &chart.data {
        ChartData::Curves { series } => {
            md.push_str("| Condition | Final Mean | Final Std | Points | Runs |\n");
            md.push_str("| --- | --- | --- | --- | --- |\n");
            for s in series {
                md.push_str(&format!(
                    "| {} | {:.4} | {:.4} | {} | {} |\n",
                    s.label,
                    s.means.last().copied().unwrap_or(f64::NAN),
                    s.stds.last().copied().unwrap_or(f64::NAN),
                    s.steps.len(),
                    s.run_count
                ));
            }
        }
        ChartData::Bars { entries } => {
            md.push_str("| Condition | Mean | Std | Runs |\n");
            md.push_str("| --- | --- | --- | --- |\n");
            for e in entries {
                md.push_str(&format!(
                    "| {} | {:.4} | {:.4} | {} |\n",
                    e.label, e.mean, e.std, e.run_count
                ));
            }
        }
        ChartData::Box { entries } => {
            md.push_str("| Condition | Scores |\n");
            md.push_str("| --- | --- |\n");
            for e in entries {
                let scores: Vec<String> =
                    e.scores.iter().map(|s| format!("{s:.4}")).collect();
                md.push_str(&format!("| {} | {} |\n", e.label, scores.join(", ")));
            }
        }
    }

    if !chart.warnings.is_empty() {
        md.push_str("\n## Warnings\n\n");
        for warning in &chart.warnings {
            md.push_str(&format!("- {warning}\n"));
        }
    }
    md
}

struct CurveStats {
    final_value: f64,
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
    points: usize,
}

/// Statistics over a mean curve. The caller guarantees a non-empty input
/// (aggregates never emit empty axes).
fn curve_stats(means: &[f64]) -> CurveStats {
    let n = means.len() as f64;
    let mean = means.iter().sum::<f64>() / n;
    let var = means
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    CurveStats {
        final_value: *means.last().unwrap_or(&f64::NAN),
        mean,
        std: var.sqrt(),
        min: means.iter().copied().fold(f64::INFINITY, f64::min),
        max: means.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        points: means.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{store_chart, ChartMode, ChartOptions};
    use crate::session::RunOptions;
    use serde_json::json;
    use tempfile::TempDir;

    fn seeded_store() -> (TempDir, MetricStore) {
        let dir = TempDir::new().unwrap();
        let store = MetricStore::open(dir.path().join("metrics.db")).unwrap();
        for (name, algo, level) in [("a", "sgd", 1.0), ("b", "sgd", 1.0), ("c", "adam", 5.0)] {
            let mut s = store
                .begin_run(
                    "proj",
                    RunOptions::named(name).with_config(json!({"algo": algo})),
                )
                .unwrap();
            for step in 0..4 {
                s.log(&[("reward", level * (step + 1) as f64)]).unwrap();
            }
            s.finish().unwrap();
        }
        (dir, store)
    }

    #[test]
    fn summary_has_one_table_per_metric() {
        let (_dir, store) = seeded_store();
        let md = summary_markdown(&store, "proj", None).unwrap();

        assert!(md.contains("# Experiment Summary — proj"));
        assert!(md.contains("## reward"));
        assert!(md.contains("| Group | Final | Mean | Std | Min | Max | Points | Runs |"));
        assert!(md.contains("| proj |"));
    }

    #[test]
    fn grouped_summary_sorts_best_first() {
        let (_dir, store) = seeded_store();
        let md = summary_markdown(&store, "proj", Some("algo")).unwrap();

        // adam's final mean (20) beats sgd's (4): adam's row comes first.
        let adam = md.find("| algo=adam |").unwrap();
        let sgd = md.find("| algo=sgd |").unwrap();
        assert!(adam < sgd);
        assert!(md.contains("| algo=adam | 20.0000 |"));
        assert!(md.contains("| algo=sgd | 4.0000 |"));
    }

    #[test]
    fn chart_report_covers_conditions_and_warnings() {
        let (_dir, store) = seeded_store();
        let mut chart = store_chart(
            &store,
            &["proj"],
            "reward",
            None,
            ChartMode::Bars,
            &ChartOptions::default(),
        )
        .unwrap();
        chart.warnings.push("something was skipped".to_string());

        let md = chart_report(&chart);
        assert!(md.contains("| proj |"));
        assert!(md.contains("## Warnings"));
        assert!(md.contains("- something was skipped"));
    }
}
