//! Application settings.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `GAZETTE_*` environment variables. Invalid numeric environment values are
//! ignored and keep the previous value.
//!
//! | Variable | Default |
//! |---|---|
//! | `GAZETTE_DATABASE_PATH` | `gazette.sqlite3` |
//! | `GAZETTE_BIND_ADDR` | `127.0.0.1:8000` |
//! | `GAZETTE_NEWS_PER_PAGE` | `10` |
//! | `GAZETTE_SESSION_TTL_SECS` | `1209600` |
//! | `GAZETTE_LOG_LEVEL` | `debug` (debug builds) / `info` (release) |
//! | `GAZETTE_LOG_DIR` | unset: log to stderr |

use crate::logging::default_log_level;
use crate::service::auth_service::DEFAULT_SESSION_TTL;
use crate::service::news_service::NEWS_COUNT_ON_HOME_PAGE;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "GAZETTE_";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Render(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Render(err) => write!(f, "failed to render config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub news_per_page: u32,
    pub session_ttl_secs: u64,
    pub log_level: String,
    /// Absolute directory for rotating log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("gazette.sqlite3"),
            bind_addr: "127.0.0.1:8000".to_string(),
            news_per_page: NEWS_COUNT_ON_HOME_PAGE,
            session_ttl_secs: DEFAULT_SESSION_TTL.as_secs(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl Settings {
    /// Loads defaults, the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        Ok(settings.normalized())
    }

    /// Overrides fields from `GAZETTE_*` variables resolved through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(value) = var("DATABASE_PATH") {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = var("BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = var("NEWS_PER_PAGE").and_then(|v| v.trim().parse().ok()) {
            self.news_per_page = value;
        }
        if let Some(value) = var("SESSION_TTL_SECS").and_then(|v| v.trim().parse().ok()) {
            self.session_ttl_secs = value;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = var("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(value)).filter(|path| !path.as_os_str().is_empty());
        }

        *self = std::mem::take(self).normalized();
    }

    /// Effective settings as TOML, as accepted by `from_toml_str`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::Render)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    fn normalized(mut self) -> Self {
        self.news_per_page = self.news_per_page.max(1);
        self.session_ttl_secs = self.session_ttl_secs.max(1);
        self
    }
}
