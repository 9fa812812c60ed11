//! Calendar privacy configuration loading.
//!
//! This crate provides:
//! - The typed [`PrivacyConfig`] (known-contact mappings, default calendar)
//! - Lenient normalization of arbitrary JSON into that type
//! - Path resolution (explicit env path → `XDG_CONFIG_HOME` → home default)
//! - A TTL-cached [`ConfigLoader`] that never fails and falls back to defaults
//! - Load snapshots recording where the active config came from

pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod shared;
pub mod snapshot;

pub use error::{ConfigError, Result};
pub use loader::{
    try_load_from, Clock, ConfigLoad, ConfigLoader, ConfigReader, DiagnosticPolicy, FsReader,
    LoaderOptions, ManualClock, SystemClock, DEFAULT_TTL,
};
pub use model::PrivacyConfig;
pub use normalize::normalize;
pub use resolve::{resolve_config_path, ConfigPathResolver, PathSource, ResolvedPath};
pub use shared::{init_shared_loader, shared_loader};
#[cfg(any(test, feature = "test-utils"))]
pub use shared::reset_shared_loader;
pub use snapshot::{ConfigOrigin, ConfigSnapshot};

/// Schema version written by default configs.
pub const CONFIG_SCHEMA_VERSION: i64 = 1;
