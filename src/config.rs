//! Configuration for NimbusKV
//!
//! Centralized configuration with sensible defaults, plus a parser for the
//! line-oriented server configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration for a NimbusKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── appendonly.aof   (append-only command log)
    ///     └── dump.ndb         (binary snapshot)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Whether mutating commands are appended to the log
    pub append_only: bool,

    /// Snapshot scheduling hints (`save <seconds> <changes>` directives).
    /// Recorded but never fired automatically; snapshots are taken via SAVE.
    pub save_points: Vec<SavePoint>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,
}

/// A `save <seconds> <changes>` directive from the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavePoint {
    /// Window length in seconds
    pub seconds: u64,

    /// Number of changes within the window
    pub changes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./nimbuskv_data"),
            append_only: false,
            save_points: Vec::new(),
            listen_addr: "127.0.0.1:6380".to_string(),
            max_connections: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from a file, starting from defaults.
    ///
    /// Format: one directive per line; blank lines and lines starting with
    /// `#` are ignored. Recognized directives:
    /// - `appendonly yes|no`
    /// - `save <seconds> <changes>` (repeatable)
    ///
    /// Malformed or unknown directives are logged and skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::default();

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["appendonly", flag] => {
                    config.append_only = *flag == "yes";
                }
                ["save", seconds, changes] => {
                    match (seconds.parse::<u64>(), changes.parse::<u64>()) {
                        (Ok(seconds), Ok(changes)) => {
                            config.save_points.push(SavePoint { seconds, changes });
                        }
                        _ => {
                            tracing::warn!(
                                "Skipping malformed save directive on line {}: {}",
                                lineno + 1,
                                line
                            );
                        }
                    }
                }
                _ => {
                    tracing::warn!(
                        "Skipping unknown directive on line {}: {}",
                        lineno + 1,
                        line
                    );
                }
            }
        }

        Ok(config)
    }

    /// Path of the append-only log file
    pub fn aof_path(&self) -> PathBuf {
        self.data_dir.join("appendonly.aof")
    }

    /// Path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("dump.ndb")
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all persistence files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Enable or disable the append-only log
    pub fn append_only(mut self, enabled: bool) -> Self {
        self.config.append_only = enabled;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
