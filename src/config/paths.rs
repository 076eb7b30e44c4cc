//! Config file locations.

use std::fs;
use std::path::PathBuf;

use crate::core::error::NwsError;

const APP_DIR_NAME: &str = "nws";

/// Platform config directory for this tool (e.g. `~/.config/nws` on Linux).
pub fn config_dir() -> Result<PathBuf, NwsError> {
    let base = dirs::config_dir().ok_or_else(|| {
        NwsError::NotFound("No configuration directory available on this platform.".to_string())
    })?;
    Ok(base.join(APP_DIR_NAME))
}

/// Config directory, created if absent.
pub fn ensure_config_dir() -> Result<PathBuf, NwsError> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn auth_config_path() -> Result<PathBuf, NwsError> {
    Ok(ensure_config_dir()?.join("notion-auth.json"))
}

pub fn workspace_root_path() -> Result<PathBuf, NwsError> {
    Ok(ensure_config_dir()?.join("workspace-root.json"))
}
