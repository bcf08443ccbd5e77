use std::path::{Path, PathBuf};

use {
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::KinogramConfig};

/// Config file name, project-local or under the user config dir.
const CONFIG_FILENAME: &str = "kinogram.toml";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Load config from the given path, with `${ENV_VAR}` substitution.
pub fn load_config(path: &Path) -> Result<KinogramConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    toml::from_str(&raw).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./kinogram.toml` (project-local)
/// 2. `~/.config/kinogram/kinogram.toml` (user-global)
///
/// Returns `KinogramConfig::default()` if no config file is found.
pub fn discover_and_load() -> KinogramConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(config) => return config,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    KinogramConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    config_dir()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .filter(|path| path.exists())
}

/// Returns the user-global config directory (`~/.config/kinogram/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "kinogram").map(|dirs| dirs.config_dir().to_path_buf())
}
