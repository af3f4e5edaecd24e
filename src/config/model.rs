// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// root = "./tmp"
/// buffer_events = 1024
///
/// [report]
/// summary_on_exit = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub report: ReportSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory to monitor. Its subdirectories are picked up as they are
    /// created; ones that already exist at startup are not.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Size of the read buffer, counted in maximum-size event records
    /// (header + 255-byte name + NUL).
    #[serde(default = "default_buffer_events")]
    pub buffer_events: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from("./tmp")
}

fn default_buffer_events() -> usize {
    1024
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            buffer_events: default_buffer_events(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    /// Print event totals and index sizes after shutdown.
    #[serde(default = "default_summary_on_exit")]
    pub summary_on_exit: bool,
}

fn default_summary_on_exit() -> bool {
    true
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            summary_on_exit: default_summary_on_exit(),
        }
    }
}
