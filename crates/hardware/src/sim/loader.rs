//! Trace and configuration loading.
//!
//! Reads JSON files from disk into [`Trace`] and [`Config`] values. Errors
//! carry the offending path.

use std::fs;
use std::path::Path;

use crate::common::error::SimError;
use crate::config::Config;
use crate::sim::trace::Trace;

/// Reads a whole file, tagging I/O errors with the path.
fn read(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a JSON miss trace.
///
/// # Errors
///
/// [`SimError::Io`] if the file cannot be read, [`SimError::Parse`] if it is
/// not a valid trace.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Trace, SimError> {
    let path = path.as_ref();
    let text = read(path)?;
    serde_json::from_str(&text).map_err(|source| SimError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads and validates a JSON configuration; omitted fields take defaults.
///
/// # Errors
///
/// [`SimError::Io`], [`SimError::Parse`], or [`SimError::Config`] if the
/// parameters fail validation.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, SimError> {
    let path = path.as_ref();
    let text = read(path)?;
    let config: Config = serde_json::from_str(&text).map_err(|source| SimError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
