use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, WhizzyError};

/// Env var that overrides the store location.
pub const STORE_PATH_ENV: &str = "WHIZZY_DB";

const APP_DIR: &str = "whizzy";
const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "whizzy.sqlite3";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Location of the per-user config file, when the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the per-user config, or defaults when there is none.
///
/// # Errors
///
/// Returns [`WhizzyError::Config`] if the file exists but cannot be read or
/// parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load a config file from an explicit path. A missing file yields defaults.
///
/// # Errors
///
/// Returns [`WhizzyError::Config`] on read or parse failures.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| WhizzyError::Config(format!("failed to read {}: {err}", path.display())))?;
    let config = toml::from_str::<UserConfig>(&content)
        .map_err(|err| WhizzyError::Config(format!("failed to parse {}: {err}", path.display())))?;
    debug!(path = %path.display(), "loaded user config");
    Ok(config)
}

/// Default store file under the platform data dir.
#[must_use]
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(STORE_FILE))
}

/// Pick the store file: flag, then env, then config, then the data dir.
///
/// Empty values are skipped.
#[must_use]
pub fn resolve_store_path(
    flag: Option<&Path>,
    env_value: Option<&str>,
    config: &UserConfig,
) -> Option<PathBuf> {
    fn non_empty(path: &Path) -> Option<PathBuf> {
        (!path.as_os_str().is_empty()).then(|| path.to_path_buf())
    }

    flag.and_then(non_empty)
        .or_else(|| env_value.map(Path::new).and_then(non_empty))
        .or_else(|| config.store.path.as_deref().and_then(non_empty))
        .or_else(default_store_path)
}
