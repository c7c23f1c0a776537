use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::CommandSettings;
use crate::fetch::FetchSettings;
use crate::registry::{self, DEFAULT_PRIORITY};
use crate::sanitize::CleaningOptions;

/// Runtime configuration, read from a RON file. Every field is optional.
///
/// ```ron
/// (
///     priority: ["firefox", "http"],
///     cleaning: (keep_header: true),
///     command: (timeout: (secs: 30, nanos: 0)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub priority: Vec<String>,
    pub cleaning: CleaningOptions,
    pub command: CommandSettings,
    pub http: FetchSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY.iter().map(|name| name.to_string()).collect(),
            cleaning: CleaningOptions::default(),
            command: CommandSettings::default(),
            http: FetchSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown backend {0:?} in priority list")]
    UnknownBackend(String),
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&content).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        mdfetch_logging::mdfetch_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|err| ConfigError::Parse {
            path: PathBuf::new(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self
            .priority
            .iter()
            .find(|name| registry::lookup(name).is_none())
        {
            Some(unknown) => Err(ConfigError::UnknownBackend(unknown.clone())),
            None => Ok(()),
        }
    }
}
