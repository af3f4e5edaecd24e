// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{Result, TreewatchError};

/// Largest accepted `buffer_events` (about 17 MiB of read buffer).
pub const MAX_BUFFER_EVENTS: usize = 65_536;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[watch].root` is not empty
/// - `1 <= [watch].buffer_events <= MAX_BUFFER_EVENTS`
///
/// It does **not** check that the root exists; establishing the root watch
/// at startup does that.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_root(cfg)?;
    validate_buffer(cfg)?;
    Ok(())
}

fn validate_root(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.root.as_os_str().is_empty() {
        return Err(TreewatchError::ConfigError(
            "[watch].root must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_buffer(cfg: &ConfigFile) -> Result<()> {
    let n = cfg.watch.buffer_events;
    if n == 0 || n > MAX_BUFFER_EVENTS {
        return Err(TreewatchError::ConfigError(format!(
            "[watch].buffer_events must be between 1 and {MAX_BUFFER_EVENTS} (got {n})"
        )));
    }
    Ok(())
}
