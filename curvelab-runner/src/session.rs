//! Run sessions: explicit handles for live metric logging.
//!
//! There is no process-global "current run". [`MetricStore::begin_run`]
//! returns a [`RunSession`] that the caller threads through `log`/`finish`;
//! independent sessions (same or different processes) are legal because each
//! owns its own WAL-mode connection. The auto-increment step counter is
//! per-handle, not process-global.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::store::{connect, MetricStore, StoreError};

/// Options for [`MetricStore::begin_run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Run name; `run_{unix_seconds}` when absent.
    pub name: Option<String>,
    /// Arbitrary config JSON, stored with the run and usable as a
    /// `group_by` source later.
    pub config: serde_json::Value,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            name: None,
            config: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl RunOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// A live logging handle for one run.
///
/// `log` writes all metrics of one call at the same auto-increment step in
/// one transaction; `log_at` targets an explicit step without advancing the
/// counter. Dropping a session without `finish` leaves the run unfinished,
/// which the run listing shows as such.
pub struct RunSession {
    conn: Connection,
    project: String,
    run: String,
    next_step: i64,
}

impl MetricStore {
    /// Start (or resume) a run and return its logging handle.
    ///
    /// Upserts the run row: beginning an existing name resumes it, keeping
    /// its original start stamp, replacing its config, clearing any finish
    /// stamp, and continuing the step counter past the highest logged step.
    pub fn begin_run(&self, project: &str, options: RunOptions) -> Result<RunSession, StoreError> {
        let name = options
            .name
            .unwrap_or_else(|| format!("run_{}", Utc::now().timestamp()));
        let config_json = serde_json::to_string(&options.config)
            .expect("config JSON serialization failed");
        let config_hash = blake3::hash(config_json.as_bytes()).to_hex().to_string();

        self.conn().execute(
            "INSERT INTO runs (project, name, config, config_hash, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (project, name) DO UPDATE SET
                 config = excluded.config,
                 config_hash = excluded.config_hash,
                 finished_at = NULL",
            params![project, name, config_json, config_hash, Utc::now().to_rfc3339()],
        )?;

        let conn = connect(self.path())?;
        let next_step: i64 = conn.query_row(
            "SELECT COALESCE(MAX(step) + 1, 0) FROM metrics
             WHERE project = ?1 AND run = ?2",
            params![project, name],
            |row| row.get(0),
        )?;

        Ok(RunSession {
            conn,
            project: project.to_string(),
            run: name,
            next_step,
        })
    }
}

impl RunSession {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    /// The step the next [`log`](Self::log) call will use.
    pub fn next_step(&self) -> i64 {
        self.next_step
    }

    /// Log metrics at the session's current step, then advance the counter.
    /// Returns the step the metrics were logged at.
    pub fn log(&mut self, metrics: &[(&str, f64)]) -> Result<i64, StoreError> {
        let step = self.next_step;
        self.write(step, metrics)?;
        self.next_step += 1;
        Ok(step)
    }

    /// Log metrics at an explicit step. Does not advance the counter.
    pub fn log_at(&mut self, step: i64, metrics: &[(&str, f64)]) -> Result<(), StoreError> {
        self.write(step, metrics)
    }

    fn write(&mut self, step: i64, metrics: &[(&str, f64)]) -> Result<(), StoreError> {
        let logged_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO metrics (project, run, metric, step, value, logged_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (metric, value) in metrics {
                stmt.execute(params![self.project, self.run, metric, step, value, logged_at])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Stamp the run finished and release the handle.
    pub fn finish(self) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1 WHERE project = ?2 AND name = ?3",
            params![Utc::now().to_rfc3339(), self.project, self.run],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, MetricStore) {
        let dir = TempDir::new().unwrap();
        let store = MetricStore::open(dir.path().join("metrics.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn log_advances_the_step_counter() {
        let (_dir, store) = store();
        let mut session = store.begin_run("p", RunOptions::named("r")).unwrap();

        assert_eq!(session.log(&[("loss", 3.0)]).unwrap(), 0);
        assert_eq!(session.log(&[("loss", 2.0), ("accuracy", 0.4)]).unwrap(), 1);
        assert_eq!(session.next_step(), 2);

        assert_eq!(
            store.series("p", "r", "loss").unwrap(),
            vec![(0.0, 3.0), (1.0, 2.0)]
        );
        assert_eq!(store.series("p", "r", "accuracy").unwrap(), vec![(1.0, 0.4)]);
    }

    #[test]
    fn log_at_does_not_advance_the_counter() {
        let (_dir, store) = store();
        let mut session = store.begin_run("p", RunOptions::named("r")).unwrap();

        session.log_at(500, &[("loss", 1.0)]).unwrap();
        assert_eq!(session.next_step(), 0);
        assert_eq!(session.log(&[("loss", 9.0)]).unwrap(), 0);
    }

    #[test]
    fn finish_stamps_the_run() {
        let (_dir, store) = store();
        let session = store.begin_run("p", RunOptions::named("r")).unwrap();
        session.finish().unwrap();

        let overview = store.run_overview("p").unwrap();
        assert!(overview[0].finished_at.is_some());
    }

    #[test]
    fn resuming_a_run_continues_past_logged_steps() {
        let (_dir, store) = store();
        let mut first = store.begin_run("p", RunOptions::named("r")).unwrap();
        first.log(&[("loss", 1.0)]).unwrap();
        first.log(&[("loss", 0.5)]).unwrap();
        first.finish().unwrap();

        let resumed = store.begin_run("p", RunOptions::named("r")).unwrap();
        assert_eq!(resumed.next_step(), 2);

        // Resume clears the finish stamp.
        let overview = store.run_overview("p").unwrap();
        assert!(overview[0].finished_at.is_none());
    }

    #[test]
    fn auto_named_runs_get_a_timestamp_name() {
        let (_dir, store) = store();
        let session = store.begin_run("p", RunOptions::default()).unwrap();
        assert!(session.run().starts_with("run_"));
    }

    #[test]
    fn config_is_stored_and_hashed() {
        let (_dir, store) = store();
        store
            .begin_run(
                "p",
                RunOptions::named("r").with_config(json!({"lr": 0.1})),
            )
            .unwrap();

        let config = store.run_config("p", "r").unwrap().unwrap();
        assert_eq!(config["lr"], 0.1);
    }

    #[test]
    fn independent_sessions_do_not_interfere() {
        let (_dir, store) = store();
        let mut a = store.begin_run("p", RunOptions::named("a")).unwrap();
        let mut b = store.begin_run("p", RunOptions::named("b")).unwrap();

        a.log(&[("loss", 1.0)]).unwrap();
        b.log(&[("loss", 2.0)]).unwrap();
        a.log(&[("loss", 0.5)]).unwrap();

        assert_eq!(
            store.series("p", "a", "loss").unwrap(),
            vec![(0.0, 1.0), (1.0, 0.5)]
        );
        assert_eq!(store.series("p", "b", "loss").unwrap(), vec![(0.0, 2.0)]);
    }
}
