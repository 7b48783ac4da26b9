//! SQLite-backed metric log.
//!
//! One database holds many projects; a project holds many runs; a run holds
//! per-step metric rows. WAL journal mode so independent sessions can write
//! while readers query. The query surface returns exactly the shape the core
//! loader consumes: ordered `(step, value)` pairs, already partitioned by
//! run and metric.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection};
use thiserror::Error;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    project     TEXT NOT NULL,
    name        TEXT NOT NULL,
    config      TEXT NOT NULL DEFAULT '{}',
    config_hash TEXT NOT NULL,
    started_at  TEXT NOT NULL,
    finished_at TEXT,
    PRIMARY KEY (project, name)
);

CREATE TABLE IF NOT EXISTS metrics (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    project   TEXT NOT NULL,
    run       TEXT NOT NULL,
    metric    TEXT NOT NULL,
    step      INTEGER NOT NULL,
    value     REAL NOT NULL,
    logged_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_metrics_lookup ON metrics(project, metric, run, step);
"#;

/// Errors from the metric store. Missing data is not an error: queries over
/// an unknown project or run return empty results, and the caller's
/// skip-and-continue policy applies.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("stored config for run '{run}' is not valid JSON: {source}")]
    BadConfig {
        run: String,
        source: serde_json::Error,
    },
}

/// One run row as listed by [`MetricStore::run_overview`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOverview {
    pub name: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub metric_count: usize,
    pub step_count: usize,
}

/// A named group of runs, as resolved by [`MetricStore::run_groups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunGroup {
    pub label: String,
    pub runs: Vec<String>,
}

/// Handle to the metric database. Queries go through this handle's own
/// connection; each [`RunSession`](crate::session::RunSession) opens its own,
/// so sessions and readers never share a connection.
pub struct MetricStore {
    path: PathBuf,
    conn: Connection,
}

/// Open a connection with the store's pragmas applied.
pub(crate) fn connect(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

impl MetricStore {
    /// Open (creating if needed) the metric database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }
        let conn = connect(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// All project names, sorted.
    pub fn projects(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT project FROM runs ORDER BY project")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Run names of one project, in start order.
    pub fn runs(&self, project: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM runs WHERE project = ?1 ORDER BY started_at, name")?;
        let rows = stmt.query_map(params![project], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Run listing with metric/step counts, for the CLI's `list` view.
    pub fn run_overview(&self, project: &str) -> Result<Vec<RunOverview>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT r.name, r.started_at, r.finished_at,
                    COUNT(DISTINCT m.metric), COUNT(DISTINCT m.step)
             FROM runs r
             LEFT JOIN metrics m ON m.project = r.project AND m.run = r.name
             WHERE r.project = ?1
             GROUP BY r.name
             ORDER BY r.started_at, r.name",
        )?;
        let rows = stmt.query_map(params![project], |row| {
            Ok(RunOverview {
                name: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                metric_count: row.get::<_, i64>(3)? as usize,
                step_count: row.get::<_, i64>(4)? as usize,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Distinct metric names logged under a project, sorted.
    pub fn metrics(&self, project: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT metric FROM metrics WHERE project = ?1 ORDER BY metric")?;
        let rows = stmt.query_map(params![project], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Distinct metric names of one run, sorted.
    pub fn run_metrics(&self, project: &str, run: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT metric FROM metrics
             WHERE project = ?1 AND run = ?2 ORDER BY metric",
        )?;
        let rows = stmt.query_map(params![project, run], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// One run's series for one metric: `(step, value)` ordered by step,
    /// insertion order within a step. This is the core loader's input shape;
    /// duplicate-step resolution (first wins) happens in `clean_pairs`.
    pub fn series(
        &self,
        project: &str,
        run: &str,
        metric: &str,
    ) -> Result<Vec<(f64, f64)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT step, value FROM metrics
             WHERE project = ?1 AND run = ?2 AND metric = ?3
             ORDER BY step, id",
        )?;
        let rows = stmt.query_map(params![project, run, metric], |row| {
            Ok((row.get::<_, i64>(0)? as f64, row.get::<_, f64>(1)?))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Integer-step variant of [`series`](Self::series), used by the CSV
    /// exporter's pivot.
    pub(crate) fn series_by_step(
        &self,
        project: &str,
        run: &str,
        metric: &str,
    ) -> Result<Vec<(i64, f64)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT step, value FROM metrics
             WHERE project = ?1 AND run = ?2 AND metric = ?3
             ORDER BY step, id",
        )?;
        let rows = stmt.query_map(params![project, run, metric], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// The config JSON stored for a run, if the run exists.
    pub fn run_config(
        &self,
        project: &str,
        run: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT config FROM runs WHERE project = ?1 AND name = ?2")?;
        let mut rows = stmt.query_map(params![project, run], |row| row.get::<_, String>(0))?;
        match rows.next().transpose()? {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StoreError::BadConfig {
                    run: run.to_string(),
                    source: e,
                }),
        }
    }

    /// Partition a project's runs into named groups.
    ///
    /// Without `group_by` the whole project is one group labelled with the
    /// project name (all runs are replicates). With `group_by`, each
    /// distinct value of that config key becomes a group labelled
    /// `{key}={value}`, in first-seen run order; runs whose config lacks the
    /// key are dropped from the grouping.
    pub fn run_groups(
        &self,
        project: &str,
        group_by: Option<&str>,
    ) -> Result<Vec<RunGroup>, StoreError> {
        let runs = self.runs(project)?;
        let Some(key) = group_by else {
            return Ok(vec![RunGroup {
                label: project.to_string(),
                runs,
            }]);
        };

        let mut groups: Vec<RunGroup> = Vec::new();
        for run in runs {
            let Some(config) = self.run_config(project, &run)? else {
                continue;
            };
            let Some(value) = config.get(key) else {
                continue;
            };
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let label = format!("{key}={rendered}");
            match groups.iter_mut().find(|g| g.label == label) {
                Some(group) => group.runs.push(run),
                None => groups.push(RunGroup {
                    label,
                    runs: vec![run],
                }),
            }
        }
        Ok(groups)
    }
}
