//! Catpoint configuration.
//!
//! ```toml
//! [store]
//! path = "~/.catpoint/state.json"
//!
//! [classifier]
//! mode = "random"   # or "cat", "no-cat"
//!
//! [sensors]
//! max = 4
//! ```
//!
//! The file lives at `~/.catpoint/config.toml` unless `CATPOINT_CONFIG` points
//! elsewhere. Every key is optional; [`CatpointSettings`] is the resolved view.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CATPOINT_CONFIG";

/// Free-tier sensor limit.
pub const DEFAULT_MAX_SENSORS: usize = 4;

const APP_DIR: &str = ".catpoint";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

// ============================================================================
// Raw file shape
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatpointConfig {
    store: Option<StoreConfig>,
    classifier: Option<ClassifierConfig>,
    sensors: Option<SensorsConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct StoreConfig {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ClassifierConfig {
    mode: Option<ClassifierMode>,
}

#[derive(Debug, Default, Deserialize)]
struct SensorsConfig {
    max: Option<usize>,
}

// ============================================================================
// Resolved settings
// ============================================================================

/// How the stand-in classifier answers.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierMode {
    /// Coin flip per image.
    #[default]
    Random,
    /// Every image contains a cat.
    Cat,
    /// No image contains a cat.
    NoCat,
}

impl ClassifierMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Cat => "cat",
            Self::NoCat => "no-cat",
        }
    }

    /// The fixed answer, or `None` for random mode.
    pub const fn fixed_answer(self) -> Option<bool> {
        match self {
            Self::Random => None,
            Self::Cat => Some(true),
            Self::NoCat => Some(false),
        }
    }
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown classifier mode '{0}' (expected random, cat or no-cat)")]
pub struct UnknownClassifierMode(String);

impl FromStr for ClassifierMode {
    type Err = UnknownClassifierMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "random" => Ok(Self::Random),
            "cat" => Ok(Self::Cat),
            "no-cat" | "nocat" => Ok(Self::NoCat),
            _ => Err(UnknownClassifierMode(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: app_dir().join("state.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSettings {
    /// Most sensors the CLI lets a user register. Always at least one.
    pub max: usize,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_SENSORS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatpointSettings {
    pub store: StoreSettings,
    pub classifier: ClassifierMode,
    pub sensors: SensorSettings,
}

impl CatpointSettings {
    /// Load from the default location.
    ///
    /// Never fails: a missing file yields defaults, and an unreadable or
    /// malformed one is logged and replaced by defaults.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            tracing::debug!("No home directory; using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %err.path().display(), error = %err, "Ignoring config");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse and resolve TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let raw: CatpointConfig = toml::from_str(content)?;
        Ok(Self::resolve(raw))
    }

    fn resolve(raw: CatpointConfig) -> Self {
        let store = raw
            .store
            .and_then(|store| store.path)
            .map(|path| StoreSettings {
                path: expand_tilde(&path),
            })
            .unwrap_or_default();

        let classifier = raw
            .classifier
            .and_then(|classifier| classifier.mode)
            .unwrap_or_default();

        let sensors = match raw.sensors.and_then(|sensors| sensors.max) {
            Some(0) => {
                tracing::warn!(
                    default = DEFAULT_MAX_SENSORS,
                    "[sensors] max must be at least 1; using default"
                );
                SensorSettings::default()
            }
            Some(max) => SensorSettings { max },
            None => SensorSettings::default(),
        };

        Self {
            store,
            classifier,
            sensors,
        }
    }
}

/// Config file location: `$CATPOINT_CONFIG`, else `~/.catpoint/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    resolve_config_path(env::var_os(CONFIG_ENV), dirs::home_dir())
}

fn resolve_config_path(override_path: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match override_path {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => home.map(|home| home.join(APP_DIR).join("config.toml")),
    }
}

/// `~/.catpoint`, or `./.catpoint` when there is no home directory.
#[must_use]
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Log files the CLI tries in order: under [`app_dir`], then under
/// `./.catpoint` for when the home directory is read-only.
#[must_use]
pub fn log_paths() -> [PathBuf; 2] {
    [app_dir(), PathBuf::from(APP_DIR)].map(|dir| dir.join("logs").join("catpoint.log"))
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_tilde(raw: &str) -> PathBuf {
    expand_tilde_with(raw, dirs::home_dir())
}

fn expand_tilde_with(raw: &str, home: Option<PathBuf>) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
            .or_else(|| raw.strip_prefix("~\\"))
    };
    match (rest, home) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
