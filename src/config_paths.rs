//! Where the replay tool looks for trigger configuration and writes its logs
//!
//! `config.yaml` holds the `InputConfig` used when no `--config` is given.
//! Daily debug logs go to a `logs/` directory next to it.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "complete-mentions";

/// Directory holding `config.yaml` and `logs/`
///
/// `$XDG_CONFIG_HOME` wins when set, then `~/.config`. Windows uses `%APPDATA%`.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// Default trigger configuration read by `InputConfig::load`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// Target of the rolling debug log
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Create the log directory if missing and return it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&logs)?;
    Ok(logs)
}
