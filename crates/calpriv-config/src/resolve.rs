//! Config file path resolution.
//!
//! Resolution order:
//! 1. `CALENDAR_PRIVACY_CONFIG` (full path to the file)
//! 2. `XDG_CONFIG_HOME` + `calendar-privacy/config.json`
//! 3. `~/.config/calendar-privacy/config.json`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable holding an explicit config file path.
pub const ENV_CONFIG_PATH: &str = "CALENDAR_PRIVACY_CONFIG";

/// Environment variable overriding the base config directory.
pub const ENV_CONFIG_HOME: &str = "XDG_CONFIG_HOME";

/// Application directory under the config base.
const APP_DIR: &str = "calendar-privacy";

/// Config file name.
const CONFIG_FILENAME: &str = "config.json";

/// Where the config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    /// `CALENDAR_PRIVACY_CONFIG`.
    ExplicitEnv,
    /// `XDG_CONFIG_HOME`.
    ConfigHomeEnv,
    /// Home directory default.
    HomeDefault,
    /// Passed in directly by the caller.
    Provided,
}

impl std::fmt::Display for PathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSource::ExplicitEnv => write!(f, "{}", ENV_CONFIG_PATH),
            PathSource::ConfigHomeEnv => write!(f, "{}", ENV_CONFIG_HOME),
            PathSource::HomeDefault => write!(f, "home default"),
            PathSource::Provided => write!(f, "provided"),
        }
    }
}

/// A resolved config path with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub source: PathSource,
}

/// Resolver over an injectable environment.
///
/// [`ConfigPathResolver::from_env`] reads the process environment; tests
/// build one from a closure to avoid mutating global state.
pub struct ConfigPathResolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    lookup: F,
    home: Option<PathBuf>,
}

impl ConfigPathResolver<fn(&str) -> Option<String>> {
    /// Resolver backed by `std::env` and `dirs::home_dir`.
    pub fn from_env() -> Self {
        fn env_lookup(name: &str) -> Option<String> {
            std::env::var(name).ok()
        }
        ConfigPathResolver {
            lookup: env_lookup,
            home: dirs::home_dir(),
        }
    }
}

impl<F> ConfigPathResolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Resolver with an explicit variable lookup and home directory.
    pub fn new(lookup: F, home: Option<PathBuf>) -> Self {
        ConfigPathResolver { lookup, home }
    }

    /// Resolve the config file path. Empty variables count as unset.
    pub fn resolve(&self) -> ResolvedPath {
        if let Some(path) = self.var(ENV_CONFIG_PATH) {
            return ResolvedPath {
                path: PathBuf::from(path),
                source: PathSource::ExplicitEnv,
            };
        }

        if let Some(base) = self.var(ENV_CONFIG_HOME) {
            return ResolvedPath {
                path: config_file_under(Path::new(&base)),
                source: PathSource::ConfigHomeEnv,
            };
        }

        let base = self
            .home
            .clone()
            .unwrap_or_default()
            .join(".config");
        ResolvedPath {
            path: config_file_under(&base),
            source: PathSource::HomeDefault,
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }
}

fn config_file_under(base: &Path) -> PathBuf {
    base.join(APP_DIR).join(CONFIG_FILENAME)
}

/// Resolve the config path from the process environment.
pub fn resolve_config_path() -> ResolvedPath {
    ConfigPathResolver::from_env().resolve()
}
