// Thu Jan 22 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Runtime settings. Loaded from a JSON config file, overridden by
/// command-line flags, normalized once before the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schedule parse/analyze tasks on the worker pool.
    pub parallel_processing: bool,
    /// Emit the overwrite-style progress line to stdout.
    pub show_progress: bool,
    /// Downgrade problems to warnings and exit 0 even with reports.
    pub graceful_exit: bool,
    /// Report every category except these. Wins over `violation_report`.
    pub violation_ignore: Vec<String>,
    /// Report only these categories (ignored if `violation_ignore` is set).
    pub violation_report: Vec<String>,
    /// Trace every registered symbol path to stdout.
    pub print_symbol_paths: bool,
    /// Worker thread count for the task pool.
    pub threads: usize,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel_processing: true,
            show_progress: false,
            graceful_exit: false,
            violation_ignore: Vec::new(),
            violation_report: Vec::new(),
            print_symbol_paths: false,
            threads: num_cpus::get(),
            verbose: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    pub fn get_default_path() -> PathBuf {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("odr-checker")
            .join("config.json")
    }

    /// The category filters are consulted with binary search; keep them
    /// sorted.
    pub fn normalize(&mut self) {
        self.violation_ignore.sort();
        self.violation_ignore.dedup();
        self.violation_report.sort();
        self.violation_report.dedup();
        if self.threads == 0 {
            self.threads = num_cpus::get();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::Validation("threads must be > 0".to_string()));
        }
        Ok(())
    }

    /// `error` normally, `warning` when a graceful exit was requested.
    pub fn problem_prefix(&self) -> &'static str {
        if self.graceful_exit {
            "warning"
        } else {
            "error"
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}
