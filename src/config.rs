use crate::{
    app_dirs::AppDirs,
    difficulty::DifficultyConfig,
    session::{SessionSettings, DEFAULT_FEEDBACK_DELAY},
    timer::TimerConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup preferences; every field falls back to its default when missing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: DifficultyConfig,
    pub timer: TimerConfig,
    pub feedback_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DifficultyConfig::default(),
            timer: TimerConfig::default(),
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY.as_millis() as u64,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            difficulty: cfg.difficulty.clone(),
            timer: cfg.timer,
            feedback_delay: Duration::from_millis(cfg.feedback_delay_ms),
        }
    }
}

/// Read-only source of startup preferences
pub trait ConfigStore {
    /// `Ok(None)` when there is nothing to load
    fn try_load(&self) -> Result<Option<Config>, ConfigError>;

    /// Like `try_load`, but never fails: problems are logged and defaults used
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(Some(cfg)) => cfg,
            Ok(None) => Config::default(),
            Err(err) => {
                log::warn!("{err}; using defaults");
                Config::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<Option<Config>, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice::<Config>(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }
}
