//! Chart-data assembly: conditions in, plot-ready series out.
//!
//! Three shapes mirror the comparison plots: curves (mean ± std over the
//! aligned axis), bars (mean/std of per-run maxima), and box (raw per-run
//! maxima). Sources are either a directory of condition folders or a metric
//! store project with optional config-key grouping. Conditions that yield no
//! data are skipped and surface in the chart's warnings, never as zeros.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use curvelab_core::domain::ConditionAggregate;
use curvelab_core::smooth::{smooth, SmoothMethod};
use curvelab_core::{
    aggregate, discover, load_runs, max_scalar, reduce_scalars, ColumnMatcher, Outcome, RunSeries,
};

use crate::store::{MetricStore, StoreError};
use crate::styles::{style_for, ConditionStyle};

/// Which plot-ready shape to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    Curves,
    Bars,
    Box,
}

/// One condition's mean ± std curve on the aligned step axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSeries {
    pub label: String,
    pub steps: Vec<f64>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    pub run_count: usize,
    pub style: ConditionStyle,
}

/// One condition's bar: mean/std over per-run maxima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
    pub label: String,
    pub mean: f64,
    pub std: f64,
    pub run_count: usize,
    pub style: ConditionStyle,
}

/// One condition's box: the raw per-run maxima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxEntry {
    pub label: String,
    pub scores: Vec<f64>,
    pub style: ConditionStyle,
}

/// Assembled chart payload, one variant per [`ChartMode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChartData {
    Curves { series: Vec<CurveSeries> },
    Bars { entries: Vec<BarEntry> },
    Box { entries: Vec<BoxEntry> },
}

impl ChartData {
    pub fn condition_count(&self) -> usize {
        match self {
            ChartData::Curves { series } => series.len(),
            ChartData::Bars { entries } => entries.len(),
            ChartData::Box { entries } => entries.len(),
        }
    }
}

/// A plot-ready chart: title, data, and skip diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub data: ChartData,
    /// Conditions or runs that contributed nothing, and smoothing
    /// pass-throughs. Library code collects these; the CLI prints them.
    pub warnings: Vec<String>,
}

/// Assembly knobs shared by all sources.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Smoothing applied to curve means and stds alike.
    pub smooth: Option<SmoothMethod>,
    /// Drop axis positions past this step, before smoothing.
    pub max_steps: Option<f64>,
    /// Conditions with fewer contributing runs are skipped.
    pub min_runs: usize,
    /// Assemble conditions in parallel (order-preserving).
    pub parallel: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            smooth: None,
            max_steps: None,
            min_runs: 1,
            parallel: true,
        }
    }
}

/// Errors assembling a chart from the metric store. Directory sources never
/// error: unreadable files become warnings.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ─── Directory source ───────────────────────────────────────────────

/// Assemble a chart from a directory of condition folders of CSVs.
///
/// `conditions` restricts and orders the legend; `None` auto-discovers.
pub fn dir_chart(
    base: &Path,
    conditions: Option<&[&str]>,
    matcher: &ColumnMatcher,
    mode: ChartMode,
    opts: &ChartOptions,
    title: &str,
) -> Chart {
    let set = discover(base, conditions);
    let entries: Vec<(String, std::path::PathBuf)> = set
        .into_iter()
        .map(|c| (c.label, c.dir))
        .collect();

    let loaded: Vec<(String, Vec<RunSeries>, Vec<String>)> = if opts.parallel {
        entries
            .into_par_iter()
            .map(|(label, dir)| load_condition(label, &dir, matcher))
            .collect()
    } else {
        entries
            .into_iter()
            .map(|(label, dir)| load_condition(label, &dir, matcher))
            .collect()
    };

    let mut warnings = Vec::new();
    let mut groups = Vec::with_capacity(loaded.len());
    for (label, runs, mut skips) in loaded {
        warnings.append(&mut skips);
        groups.push((label, runs));
    }

    let (data, mut assembly_warnings) = assemble(groups, mode, opts);
    warnings.append(&mut assembly_warnings);
    Chart {
        title: title.to_string(),
        data,
        warnings,
    }
}

fn load_condition(
    label: String,
    dir: &Path,
    matcher: &ColumnMatcher,
) -> (String, Vec<RunSeries>, Vec<String>) {
    let loaded = load_runs(dir, matcher);
    let skips = loaded
        .skipped
        .iter()
        .map(|s| format!("{label}: {s}"))
        .collect();
    (label, loaded.runs, skips)
}

// ─── Store source ───────────────────────────────────────────────────

/// Assemble a chart from logged metrics.
///
/// One project with `group_by` compares config-key values within it; several
/// projects compare the projects themselves (each project is one condition,
/// its runs the replicates).
pub fn store_chart(
    store: &MetricStore,
    projects: &[&str],
    metric: &str,
    group_by: Option<&str>,
    mode: ChartMode,
    opts: &ChartOptions,
) -> Result<Chart, ChartError> {
    let mut warnings = Vec::new();

    // (label, project, runs) resolved up front; SQLite reads stay on this
    // thread, only the pure aggregation fans out.
    let mut resolved: Vec<(String, Vec<(String, String)>)> = Vec::new();
    if projects.len() == 1 {
        for group in store.run_groups(projects[0], group_by)? {
            let runs = group
                .runs
                .into_iter()
                .map(|r| (projects[0].to_string(), r))
                .collect();
            resolved.push((group.label, runs));
        }
    } else {
        if group_by.is_some() {
            warnings.push("group_by is ignored when comparing multiple projects".to_string());
        }
        for project in projects {
            let runs = store
                .runs(project)?
                .into_iter()
                .map(|r| (project.to_string(), r))
                .collect();
            resolved.push((project.to_string(), runs));
        }
    }

    let mut groups: Vec<(String, Vec<RunSeries>)> = Vec::with_capacity(resolved.len());
    for (label, runs) in resolved {
        let mut series = Vec::with_capacity(runs.len());
        for (project, run) in runs {
            let pairs = store.series(&project, &run, metric)?;
            match curvelab_core::clean_pairs(pairs) {
                Outcome::Ready(s) => series.push(s),
                Outcome::Absent(a) => warnings.push(format!("{project}/{run}: {a}")),
            }
        }
        groups.push((label, series));
    }

    let (data, mut assembly_warnings) = assemble(groups, mode, opts);
    warnings.append(&mut assembly_warnings);

    let title = if projects.len() == 1 {
        format!("{} — {metric}", projects[0])
    } else {
        format!("{} — {metric}", projects.join(" vs "))
    };
    Ok(Chart {
        title,
        data,
        warnings,
    })
}

// ─── Assembly ───────────────────────────────────────────────────────

fn assemble(
    groups: Vec<(String, Vec<RunSeries>)>,
    mode: ChartMode,
    opts: &ChartOptions,
) -> (ChartData, Vec<String>) {
    match mode {
        ChartMode::Curves => {
            let per_group = map_groups(groups, opts.parallel, |idx, label, runs| {
                curve_for(idx, label, &runs, opts)
            });
            collect(per_group, |series| ChartData::Curves { series })
        }
        ChartMode::Bars => {
            let per_group = map_groups(groups, opts.parallel, |idx, label, runs| {
                bar_for(idx, label, &runs)
            });
            collect(per_group, |entries| ChartData::Bars { entries })
        }
        ChartMode::Box => {
            let per_group = map_groups(groups, opts.parallel, |idx, label, runs| {
                box_for(idx, label, &runs)
            });
            collect(per_group, |entries| ChartData::Box { entries })
        }
    }
}

/// Order-preserving per-condition map, parallel when asked.
fn map_groups<T: Send>(
    groups: Vec<(String, Vec<RunSeries>)>,
    parallel: bool,
    f: impl Fn(usize, String, Vec<RunSeries>) -> T + Send + Sync,
) -> Vec<T> {
    if parallel {
        groups
            .into_par_iter()
            .enumerate()
            .map(|(idx, (label, runs))| f(idx, label, runs))
            .collect()
    } else {
        groups
            .into_iter()
            .enumerate()
            .map(|(idx, (label, runs))| f(idx, label, runs))
            .collect()
    }
}

fn collect<E>(
    per_group: Vec<(Option<E>, Vec<String>)>,
    wrap: impl FnOnce(Vec<E>) -> ChartData,
) -> (ChartData, Vec<String>) {
    let mut entries = Vec::with_capacity(per_group.len());
    let mut warnings = Vec::new();
    for (entry, mut w) in per_group {
        warnings.append(&mut w);
        if let Some(e) = entry {
            entries.push(e);
        }
    }
    (wrap(entries), warnings)
}

fn curve_for(
    idx: usize,
    label: String,
    runs: &[RunSeries],
    opts: &ChartOptions,
) -> (Option<CurveSeries>, Vec<String>) {
    let mut warnings = Vec::new();
    let agg = match aggregate(runs, opts.min_runs) {
        Outcome::Ready(agg) => agg,
        Outcome::Absent(a) => {
            warnings.push(format!("{label}: {a}"));
            return (None, warnings);
        }
    };
    let agg = match opts.max_steps {
        Some(cut) => agg.truncated(cut),
        None => agg,
    };
    if agg.is_empty() {
        warnings.push(format!("{label}: no steps below the max-steps cut"));
        return (None, warnings);
    }

    let ConditionAggregate {
        steps,
        means,
        stds,
        run_count,
    } = agg;
    let (means, stds) = match opts.smooth {
        Some(method) => {
            let smoothed = smooth(&means, method);
            if let Some(reason) = smoothed.pass_reason() {
                warnings.push(format!("{label}: smoothing passed through ({reason})"));
            }
            // Stds follow the same filter so the shading matches the curve.
            (smoothed.into_values(), smooth(&stds, method).into_values())
        }
        None => (means, stds),
    };

    let style = style_for(&label, idx);
    (
        Some(CurveSeries {
            label,
            steps,
            means,
            stds,
            run_count,
            style,
        }),
        warnings,
    )
}

fn bar_for(idx: usize, label: String, runs: &[RunSeries]) -> (Option<BarEntry>, Vec<String>) {
    let scores = per_run_maxima(runs);
    match reduce_scalars(&scores) {
        Outcome::Ready(summary) => {
            let style = style_for(&label, idx);
            (
                Some(BarEntry {
                    label,
                    mean: summary.mean,
                    std: summary.std,
                    run_count: summary.count(),
                    style,
                }),
                Vec::new(),
            )
        }
        Outcome::Absent(a) => (None, vec![format!("{label}: {a}")]),
    }
}

fn box_for(idx: usize, label: String, runs: &[RunSeries]) -> (Option<BoxEntry>, Vec<String>) {
    let scores = per_run_maxima(runs);
    if scores.is_empty() {
        return (None, vec![format!("{label}: no scalars to reduce")]);
    }
    let style = style_for(&label, idx);
    (
        Some(BoxEntry {
            label,
            scores,
            style,
        }),
        Vec::new(),
    )
}

fn per_run_maxima(runs: &[RunSeries]) -> Vec<f64> {
    runs.iter()
        .filter_map(|run| max_scalar(run).ready())
        .collect()
}
