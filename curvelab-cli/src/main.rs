//! CurveLab CLI — experiment tracking and comparison commands.
//!
//! Commands:
//! - `demo` — seed synthetic training runs into a metric database
//! - `plot` — assemble chart data from logged metrics and write artifacts
//! - `compare` — the same from a directory of condition folders of CSVs
//! - `export` — one pivoted CSV per run
//! - `summary` — Markdown experiment summary
//! - `list` — projects, or runs with step/metric counts

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use curvelab_core::smooth::SmoothMethod;
use curvelab_core::ColumnMatcher;
use curvelab_runner::{
    dir_chart, export_runs_csv, save_chart_artifacts, seed_demo_runs, store_chart,
    summary_markdown, Chart, ChartData, ChartMode, ChartOptions, CompareSpec, DemoOptions,
    MetricStore,
};

#[derive(Parser)]
#[command(
    name = "curvelab",
    about = "CurveLab CLI — experiment tracking and run comparison"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed synthetic training runs into the metric database.
    Demo {
        /// Metric database path.
        #[arg(long)]
        db: PathBuf,

        /// Project to seed.
        #[arg(long, default_value = "demo")]
        project: String,

        /// Replicate runs per algorithm.
        #[arg(long, default_value_t = 3)]
        seeds: usize,

        /// Logged steps per run.
        #[arg(long, default_value_t = 200)]
        steps: usize,
    },
    /// Assemble chart data from logged metrics and write artifacts.
    Plot {
        /// Metric database path.
        #[arg(long)]
        db: PathBuf,

        /// Project to plot. Repeat to compare projects side by side.
        #[arg(long, required = true)]
        project: Vec<String>,

        /// Metric name (e.g. loss).
        #[arg(long)]
        metric: String,

        /// Config key to group runs by (single project only).
        #[arg(long)]
        group_by: Option<String>,

        /// Chart shape: curves, bars, box.
        #[arg(long, default_value = "curves")]
        mode: String,

        /// Smoothing: ema or savgol.
        #[arg(long)]
        smooth: Option<String>,

        /// EMA span (with --smooth ema).
        #[arg(long, default_value_t = 100)]
        window: usize,

        /// Drop axis positions past this step.
        #[arg(long)]
        max_steps: Option<f64>,

        /// Artifact output directory; omit to print the summary only.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Compare condition folders of CSV exports.
    Compare {
        /// Directory holding one folder of CSVs per condition.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Conditions in legend order (comma-separated); omit to auto-discover.
        #[arg(long, value_delimiter = ',')]
        conditions: Option<Vec<String>>,

        /// TOML comparison spec; mutually exclusive with --dir.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Chart shape: curves, bars, box.
        #[arg(long, default_value = "curves")]
        mode: String,

        /// Smoothing: ema or savgol.
        #[arg(long)]
        smooth: Option<String>,

        /// EMA span (with --smooth ema).
        #[arg(long, default_value_t = 100)]
        window: usize,

        /// Drop axis positions past this step.
        #[arg(long)]
        max_steps: Option<f64>,

        /// Artifact output directory; omit to print the summary only.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write one pivoted CSV per run.
    Export {
        /// Metric database path.
        #[arg(long)]
        db: PathBuf,

        /// Project to export.
        #[arg(long)]
        project: String,

        /// Output directory.
        #[arg(long, default_value = "export")]
        out: PathBuf,
    },
    /// Render a Markdown experiment summary.
    Summary {
        /// Metric database path.
        #[arg(long)]
        db: PathBuf,

        /// Project to summarize.
        #[arg(long)]
        project: String,

        /// Config key to group runs by.
        #[arg(long)]
        group_by: Option<String>,

        /// Output file; omit to print to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List projects, or a project's runs.
    List {
        /// Metric database path.
        #[arg(long)]
        db: PathBuf,

        /// Project whose runs to list; omit to list projects.
        #[arg(long)]
        project: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            db,
            project,
            seeds,
            steps,
        } => run_demo(db, project, seeds, steps),
        Commands::Plot {
            db,
            project,
            metric,
            group_by,
            mode,
            smooth,
            window,
            max_steps,
            out,
        } => run_plot(db, project, metric, group_by, mode, smooth, window, max_steps, out),
        Commands::Compare {
            dir,
            conditions,
            config,
            mode,
            smooth,
            window,
            max_steps,
            out,
        } => run_compare(dir, conditions, config, mode, smooth, window, max_steps, out),
        Commands::Export { db, project, out } => run_export(db, project, out),
        Commands::Summary {
            db,
            project,
            group_by,
            out,
        } => run_summary(db, project, group_by, out),
        Commands::List { db, project } => run_list(db, project),
    }
}

fn run_demo(db: PathBuf, project: String, seeds: usize, steps: usize) -> Result<()> {
    if seeds == 0 || steps == 0 {
        bail!("--seeds and --steps must be positive");
    }
    let store = MetricStore::open(&db)?;
    let created = seed_demo_runs(&store, &project, &DemoOptions { seeds, steps })?;
    println!(
        "Seeded {created} runs ({steps} steps each) into project '{project}' at {}",
        db.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_plot(
    db: PathBuf,
    projects: Vec<String>,
    metric: String,
    group_by: Option<String>,
    mode: String,
    smooth: Option<String>,
    window: usize,
    max_steps: Option<f64>,
    out: Option<PathBuf>,
) -> Result<()> {
    if projects.len() > 1 && group_by.is_some() {
        bail!("--group-by only applies to a single --project");
    }
    let store = MetricStore::open(&db)?;
    let opts = ChartOptions {
        smooth: parse_smooth(smooth.as_deref(), window)?,
        max_steps,
        ..ChartOptions::default()
    };
    let project_refs: Vec<&str> = projects.iter().map(String::as_str).collect();
    let chart = store_chart(
        &store,
        &project_refs,
        &metric,
        group_by.as_deref(),
        parse_mode(&mode)?,
        &opts,
    )?;
    finish_chart(&chart, &metric, out)
}

#[allow(clippy::too_many_arguments)]
fn run_compare(
    dir: Option<PathBuf>,
    conditions: Option<Vec<String>>,
    config: Option<PathBuf>,
    mode: String,
    smooth: Option<String>,
    window: usize,
    max_steps: Option<f64>,
    out: Option<PathBuf>,
) -> Result<()> {
    if dir.is_some() && config.is_some() {
        bail!("--dir and --config are mutually exclusive");
    }

    let matcher = ColumnMatcher::default();
    let (chart, name, out) = if let Some(path) = config {
        let spec = CompareSpec::from_file(&path)?;
        let condition_refs = spec.condition_refs();
        let chart = dir_chart(
            &spec.dir,
            condition_refs.as_deref(),
            &matcher,
            spec.mode,
            &spec.chart_options(),
            spec.title(),
        );
        (chart, spec.title().to_string(), out.or(spec.output.clone()))
    } else {
        let Some(dir) = dir else {
            bail!("one of --dir or --config is required");
        };
        let opts = ChartOptions {
            smooth: parse_smooth(smooth.as_deref(), window)?,
            max_steps,
            ..ChartOptions::default()
        };
        let condition_refs: Option<Vec<&str>> = conditions
            .as_ref()
            .map(|names| names.iter().map(String::as_str).collect());
        let chart = dir_chart(
            &dir,
            condition_refs.as_deref(),
            &matcher,
            parse_mode(&mode)?,
            &opts,
            "comparison",
        );
        (chart, "comparison".to_string(), out)
    };

    finish_chart(&chart, &name, out)
}

fn run_export(db: PathBuf, project: String, out: PathBuf) -> Result<()> {
    let store = MetricStore::open(&db)?;
    let written = export_runs_csv(&store, &project, &out)?;
    if written.is_empty() {
        bail!("project '{project}' has no runs with logged metrics");
    }
    println!("Wrote {} run CSVs to {}", written.len(), out.display());
    Ok(())
}

fn run_summary(
    db: PathBuf,
    project: String,
    group_by: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let store = MetricStore::open(&db)?;
    let md = summary_markdown(&store, &project, group_by.as_deref())?;
    match out {
        Some(path) => {
            std::fs::write(&path, md)?;
            println!("Summary written to {}", path.display());
        }
        None => print!("{md}"),
    }
    Ok(())
}

fn run_list(db: PathBuf, project: Option<String>) -> Result<()> {
    let store = MetricStore::open(&db)?;
    match project {
        None => {
            let projects = store.projects()?;
            if projects.is_empty() {
                println!("No projects in {}", db.display());
                return Ok(());
            }
            for project in projects {
                println!("{project}");
            }
        }
        Some(project) => {
            let overview = store.run_overview(&project)?;
            if overview.is_empty() {
                bail!("project '{project}' has no runs");
            }
            println!("{:<24} {:>8} {:>8}  {}", "RUN", "METRICS", "STEPS", "STATUS");
            for run in overview {
                let status = if run.finished_at.is_some() {
                    "finished"
                } else {
                    "running"
                };
                println!(
                    "{:<24} {:>8} {:>8}  {status}",
                    run.name, run.metric_count, run.step_count
                );
            }
        }
    }
    Ok(())
}

fn parse_mode(mode: &str) -> Result<ChartMode> {
    match mode {
        "curves" => Ok(ChartMode::Curves),
        "bars" => Ok(ChartMode::Bars),
        "box" => Ok(ChartMode::Box),
        other => bail!("unknown mode '{other}' (expected curves, bars, or box)"),
    }
}

fn parse_smooth(smooth: Option<&str>, window: usize) -> Result<Option<SmoothMethod>> {
    match smooth {
        None => Ok(None),
        Some("ema") => Ok(Some(SmoothMethod::Ema { window })),
        Some("savgol") => Ok(Some(SmoothMethod::Savgol)),
        Some(other) => bail!("unknown smoothing '{other}' (expected ema or savgol)"),
    }
}

/// Print the chart summary, surface warnings, and write artifacts if asked.
fn finish_chart(chart: &Chart, name: &str, out: Option<PathBuf>) -> Result<()> {
    println!("{}", chart.title);
    match &chart.data {
        ChartData::Curves { series } => {
            println!("{:<20} {:>8} {:>12} {:>12}", "CONDITION", "RUNS", "POINTS", "FINAL");
            for s in series {
                println!(
                    "{:<20} {:>8} {:>12} {:>12.4}",
                    s.label,
                    s.run_count,
                    s.steps.len(),
                    s.means.last().copied().unwrap_or(f64::NAN)
                );
            }
        }
        ChartData::Bars { entries } => {
            println!("{:<20} {:>8} {:>12} {:>12}", "CONDITION", "RUNS", "MEAN", "STD");
            for e in entries {
                println!(
                    "{:<20} {:>8} {:>12.4} {:>12.4}",
                    e.label, e.run_count, e.mean, e.std
                );
            }
        }
        ChartData::Box { entries } => {
            println!("{:<20} {:>8}", "CONDITION", "RUNS");
            for e in entries {
                println!("{:<20} {:>8}", e.label, e.scores.len());
            }
        }
    }
    for warning in &chart.warnings {
        eprintln!("warning: {warning}");
    }
    if chart.data.condition_count() == 0 {
        bail!("no condition produced data");
    }
    if let Some(out) = out {
        let run_dir = save_chart_artifacts(chart, name, &out)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}
