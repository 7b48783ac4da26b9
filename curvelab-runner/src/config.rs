//! Comparison spec files.
//!
//! A `CompareSpec` captures one directory comparison — conditions, chart
//! mode, smoothing, truncation — so a figure can be regenerated from a TOML
//! file instead of a flag soup.
//!
//! ```toml
//! dir = "results/cartpole"
//! conditions = ["sgd", "adam"]
//! mode = "curves"
//! max_steps = 100000
//! output = "plots"
//!
//! [smoothing]
//! type = "EMA"
//! window = 100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use curvelab_core::smooth::SmoothMethod;

use crate::charts::{ChartMode, ChartOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read spec file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid spec file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Serializable description of one directory comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSpec {
    /// Directory holding one folder of CSVs per condition.
    pub dir: PathBuf,

    /// Legend entries in order; omit to auto-discover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,

    #[serde(default = "default_mode")]
    pub mode: ChartMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<f64>,

    #[serde(default = "default_min_runs")]
    pub min_runs: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Artifact output directory; omit to skip writing artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Table-valued, so it stays last for TOML serialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<SmoothMethod>,
}

fn default_mode() -> ChartMode {
    ChartMode::Curves
}

fn default_min_runs() -> usize {
    1
}

impl CompareSpec {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            smooth: self.smoothing,
            max_steps: self.max_steps,
            min_runs: self.min_runs,
            ..ChartOptions::default()
        }
    }

    /// Condition names as borrowed slices, the shape `discover` takes.
    pub fn condition_refs(&self) -> Option<Vec<&str>> {
        self.conditions
            .as_ref()
            .map(|names| names.iter().map(String::as_str).collect())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("comparison")
    }
}
