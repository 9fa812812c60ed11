//! Load snapshots for diagnostics.
//!
//! A snapshot records where the active config came from so operators can tell
//! a deliberate empty mapping table from a file that failed to parse.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::PathSource;
use crate::PrivacyConfig;

/// How the cached config was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigOrigin {
    /// Parsed from the config file.
    File,
    /// No file at the resolved path; defaults in use.
    Missing,
    /// The file could not be read or parsed; defaults in use.
    Fallback { reason: String },
}

impl ConfigOrigin {
    /// Whether defaults are in use.
    pub fn is_default(&self) -> bool {
        !matches!(self, ConfigOrigin::File)
    }
}

/// Provenance of a loaded config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When the config was (re)loaded.
    pub loaded_at: DateTime<Utc>,

    /// Resolved file path.
    pub path: PathBuf,

    /// How the path was resolved.
    pub path_source: PathSource,

    /// How the config was produced.
    pub origin: ConfigOrigin,

    /// SHA-256 of the file content, when the file was read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Schema version of the active config.
    #[serde(default)]
    pub version: Option<i64>,

    /// Number of known contacts.
    pub mapping_count: usize,

    /// Whether this load was answered from cache.
    #[serde(default)]
    pub from_cache: bool,
}

impl ConfigSnapshot {
    pub(crate) fn new(
        path: PathBuf,
        path_source: PathSource,
        origin: ConfigOrigin,
        content: Option<&str>,
        config: &PrivacyConfig,
    ) -> Self {
        ConfigSnapshot {
            loaded_at: Utc::now(),
            path,
            path_source,
            origin,
            content_hash: content.map(hash_content),
            version: config.version,
            mapping_count: config.mapping_count(),
            from_cache: false,
        }
    }

    /// Same snapshot, marked as a cache hit.
    pub(crate) fn cached(&self) -> Self {
        ConfigSnapshot {
            from_cache: true,
            ..self.clone()
        }
    }
}

/// Hex SHA-256 of `content`.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_content() {
        let hash = hash_content("{}");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_content("{}"));
        assert_ne!(hash, hash_content("{ }"));
    }

    #[test]
    fn test_origin_is_default() {
        assert!(!ConfigOrigin::File.is_default());
        assert!(ConfigOrigin::Missing.is_default());
        assert!(ConfigOrigin::Fallback {
            reason: "bad".to_string()
        }
        .is_default());
    }

    #[test]
    fn test_snapshot_serializes() {
        let config = PrivacyConfig::default();
        let snapshot = ConfigSnapshot::new(
            PathBuf::from("/tmp/config.json"),
            PathSource::ExplicitEnv,
            ConfigOrigin::Missing,
            None,
            &config,
        );
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["origin"]["kind"], "missing");
        assert_eq!(json["path_source"], "explicit_env");
        assert!(json.get("content_hash").is_none());
    }
}
