//! CurveLab Runner — experiment tracking around the core engine.
//!
//! This crate builds on `curvelab-core` to provide:
//! - SQLite-backed metric store with explicit run sessions
//! - Chart-data assembly (curves, bars, box) from the store or from
//!   directories of CSV exports
//! - Style metadata for a fixed academic palette
//! - TOML comparison specs
//! - Per-run CSV export and chart artifact bundles
//! - Markdown experiment summaries
//! - Deterministic synthetic training runs for demos and tests

pub mod charts;
pub mod config;
pub mod export;
pub mod report;
pub mod session;
pub mod store;
pub mod styles;
pub mod synthetic;

pub use charts::{
    dir_chart, store_chart, BarEntry, BoxEntry, Chart, ChartData, ChartError, ChartMode,
    ChartOptions, CurveSeries,
};
pub use config::{CompareSpec, ConfigError};
pub use export::{chart_csv, export_runs_csv, save_chart_artifacts};
pub use report::{chart_report, summary_markdown};
pub use session::{RunOptions, RunSession};
pub use store::{MetricStore, RunGroup, RunOverview, StoreError};
pub use styles::{style_for, ConditionStyle, LineStyle};
pub use synthetic::{seed_demo_runs, DemoOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn chart_types_are_send_sync() {
        assert_send::<Chart>();
        assert_sync::<Chart>();
        assert_send::<CurveSeries>();
        assert_sync::<CurveSeries>();
        assert_send::<ConditionStyle>();
        assert_sync::<ConditionStyle>();
        assert_send::<ChartOptions>();
        assert_sync::<ChartOptions>();
    }

    #[test]
    fn spec_types_are_send_sync() {
        assert_send::<CompareSpec>();
        assert_sync::<CompareSpec>();
        assert_send::<RunOptions>();
        assert_sync::<RunOptions>();
    }

    #[test]
    fn store_handles_are_send() {
        // SQLite connections are Send but not Sync: a store or session may
        // move to a worker thread, never be shared between threads.
        assert_send::<MetricStore>();
        assert_send::<RunSession>();
    }
}
