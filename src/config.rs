//! Repository list loaded once at startup.

use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ENV_CONFIG_PATH: &str = "GITROUTINE_CONFIG";
pub const ENV_GIT_BIN: &str = "GITROUTINE_GIT";
pub const ENV_LOG_FILTER: &str = "GITROUTINE_LOG";
pub const DEFAULT_EXECUTABLE: &str = "git";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Repository {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Path")]
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    #[serde(rename = "Repositories", default)]
    pub repositories: Vec<Repository>,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, falling back to an empty repository list on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::info!(
                    path = %path.display(),
                    repositories = config.repositories.len(),
                    "configuration loaded"
                );
                config
            }
            Err(error) => {
                tracing::warn!(%error, "continuing with an empty repository list");
                Self::default()
            }
        }
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        let mut config: Configuration = serde_json::from_str(data)?;
        for repo in &mut config.repositories {
            repo.path = expand_tilde(&repo.path);
        }
        Ok(config)
    }
}

/// Config path from the first CLI argument, the environment, or the cwd.
pub fn resolve_config_path(cli_arg: Option<&str>) -> PathBuf {
    if let Some(arg) = cli_arg.filter(|a| !a.is_empty()) {
        return PathBuf::from(arg);
    }
    env::var_os(ENV_CONFIG_PATH)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

pub fn executable_name() -> String {
    env::var(ENV_GIT_BIN)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string())
}

pub fn log_file_path() -> PathBuf {
    let base = env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| env::home_dir().map(|h| h.join(".local").join("state")));
    match base {
        Some(base) => base.join("gitroutine").join("gitroutine.log"),
        None => PathBuf::from("gitroutine.log"),
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
