//! TTL-cached config loader.
//!
//! The loader moves between three states:
//!
//! - **Empty**: nothing cached yet.
//! - **Fresh**: cached and younger than the TTL; served without I/O.
//! - **Stale**: cached but at or past the TTL, or explicitly invalidated;
//!   the next load re-reads the file.
//!
//! Loading never fails. A missing file yields defaults silently; any other
//! read or parse problem yields defaults plus a diagnostic, subject to the
//! injected [`DiagnosticPolicy`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::resolve::{resolve_config_path, PathSource, ResolvedPath};
use crate::snapshot::{ConfigOrigin, ConfigSnapshot};
use crate::{normalize, PrivacyConfig};

/// Default freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time via [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.start + offset
    }
}

/// Reads config file content.
pub trait ConfigReader: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl ConfigReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Whether load failures are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticPolicy {
    /// Report unexpected failures with `tracing::warn!`.
    #[default]
    Emit,
    /// Say nothing (tests, embedded callers with their own reporting).
    Silent,
}

/// Loader tuning and injected capabilities.
#[derive(Clone)]
pub struct LoaderOptions {
    pub ttl: Duration,
    pub clock: Arc<dyn Clock>,
    pub reader: Arc<dyn ConfigReader>,
    pub diagnostics: DiagnosticPolicy,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions {
            ttl: DEFAULT_TTL,
            clock: Arc::new(SystemClock),
            reader: Arc::new(FsReader),
            diagnostics: DiagnosticPolicy::Emit,
        }
    }
}

impl LoaderOptions {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn ConfigReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticPolicy) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl std::fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("ttl", &self.ttl)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

/// A config plus the snapshot describing where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Arc<PrivacyConfig>,
    pub snapshot: ConfigSnapshot,
}

#[derive(Debug)]
struct CacheEntry {
    config: Arc<PrivacyConfig>,
    /// `None` once invalidated.
    loaded_at: Option<Instant>,
    snapshot: ConfigSnapshot,
}

/// Cached accessor for the privacy config file.
///
/// The path is resolved once, at construction. The cache lock is held across
/// a reload, so concurrent callers hitting a stale cache share one read.
#[derive(Debug)]
pub struct ConfigLoader {
    resolved: ResolvedPath,
    options: LoaderOptions,
    cache: Mutex<Option<CacheEntry>>,
}

impl ConfigLoader {
    /// Loader for the path resolved from the process environment.
    pub fn new(options: LoaderOptions) -> Self {
        Self::from_resolved(resolve_config_path(), options)
    }

    /// Loader for an explicit path.
    pub fn with_path(path: impl Into<PathBuf>, options: LoaderOptions) -> Self {
        Self::from_resolved(
            ResolvedPath {
                path: path.into(),
                source: PathSource::Provided,
            },
            options,
        )
    }

    /// Loader for an already resolved path.
    pub fn from_resolved(resolved: ResolvedPath, options: LoaderOptions) -> Self {
        debug!(
            path = %resolved.path.display(),
            source = %resolved.source,
            "privacy config path resolved"
        );
        ConfigLoader {
            resolved,
            options,
            cache: Mutex::new(None),
        }
    }

    /// Return the current config, reading the file if the cache is not fresh.
    pub fn load(&self) -> Arc<PrivacyConfig> {
        self.load_with_snapshot().config
    }

    /// Like [`ConfigLoader::load`], with provenance.
    pub fn load_with_snapshot(&self) -> ConfigLoad {
        let mut cache = self.lock();
        let now = self.options.clock.now();

        if let Some(entry) = cache.as_ref() {
            if self.is_fresh(entry, now) {
                debug!(path = %self.resolved.path.display(), "privacy config served from cache");
                return ConfigLoad {
                    config: Arc::clone(&entry.config),
                    snapshot: entry.snapshot.cached(),
                };
            }
        }

        let (config, origin, content) = match self.try_load() {
            Ok((config, content)) => (config, ConfigOrigin::File, Some(content)),
            Err(err) if err.is_not_found() => {
                debug!(
                    path = %self.resolved.path.display(),
                    "no privacy config file; using defaults"
                );
                (PrivacyConfig::default(), ConfigOrigin::Missing, None)
            }
            Err(err) => {
                self.report(&err);
                (
                    PrivacyConfig::default(),
                    ConfigOrigin::Fallback {
                        reason: err.to_string(),
                    },
                    None,
                )
            }
        };

        let snapshot = ConfigSnapshot::new(
            self.resolved.path.clone(),
            self.resolved.source,
            origin,
            content.as_deref(),
            &config,
        );
        let config = Arc::new(config);

        *cache = Some(CacheEntry {
            config: Arc::clone(&config),
            loaded_at: Some(now),
            snapshot: snapshot.clone(),
        });

        ConfigLoad { config, snapshot }
    }

    /// Read and normalize the file, surfacing every failure.
    ///
    /// Returns the config and the raw file content.
    pub fn try_load(&self) -> Result<(PrivacyConfig, String)> {
        try_load_from(self.options.reader.as_ref(), &self.resolved.path)
    }

    /// Force the next load to re-read the file.
    pub fn invalidate_cache(&self) {
        if let Some(entry) = self.lock().as_mut() {
            entry.loaded_at = None;
        }
    }

    /// Resolved config file path.
    pub fn path(&self) -> &Path {
        &self.resolved.path
    }

    /// How the path was resolved.
    pub fn path_source(&self) -> PathSource {
        self.resolved.source
    }

    /// Freshness window in use.
    pub fn ttl(&self) -> Duration {
        self.options.ttl
    }

    /// Whether load failures are reported.
    pub fn diagnostics(&self) -> DiagnosticPolicy {
        self.options.diagnostics
    }

    /// Snapshot of the most recent file load, if any.
    pub fn last_snapshot(&self) -> Option<ConfigSnapshot> {
        self.lock().as_ref().map(|entry| entry.snapshot.clone())
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        entry
            .loaded_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.options.ttl)
    }

    fn report(&self, err: &ConfigError) {
        if self.options.diagnostics == DiagnosticPolicy::Emit {
            warn!(
                path = %self.resolved.path.display(),
                error = %err,
                "failed to load privacy config; using defaults"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

/// Read `path` with `reader`, parse it, and normalize it.
pub fn try_load_from(reader: &dyn ConfigReader, path: &Path) -> Result<(PrivacyConfig, String)> {
    let content = reader
        .read_to_string(path)
        .map_err(|e| ConfigError::from_io(path.to_path_buf(), e))?;

    let value: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if !value.is_object() {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
            found: json_kind(&value),
        });
    }

    Ok((normalize(&value), content))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    /// In-memory reader that counts reads.
    struct StubReader {
        content: Mutex<io::Result<String>>,
        reads: AtomicUsize,
    }

    impl StubReader {
        fn ok(content: &str) -> Arc<Self> {
            Arc::new(StubReader {
                content: Mutex::new(Ok(content.to_string())),
                reads: AtomicUsize::new(0),
            })
        }

        fn err(kind: io::ErrorKind) -> Arc<Self> {
            Arc::new(StubReader {
                content: Mutex::new(Err(io::Error::new(kind, "stub"))),
                reads: AtomicUsize::new(0),
            })
        }

        fn set(&self, content: &str) {
            *self.content.lock().unwrap() = Ok(content.to_string());
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl ConfigReader for StubReader {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match &*self.content.lock().unwrap() {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(io::Error::new(e.kind(), "stub")),
            }
        }
    }

    fn loader(reader: Arc<StubReader>, clock: Arc<ManualClock>) -> ConfigLoader {
        let options = LoaderOptions::default()
            .with_reader(reader)
            .with_clock(clock)
            .with_diagnostics(DiagnosticPolicy::Silent);
        ConfigLoader::with_path("/virtual/config.json", options)
    }

    #[test]
    fn test_fresh_cache_skips_read() {
        let reader = StubReader::ok(r#"{"emailMappings":{"A@x.com":"A"}}"#);
        let clock = Arc::new(ManualClock::new());
        let loader = loader(reader.clone(), clock.clone());

        let first = loader.load();
        clock.advance(Duration::from_secs(59));
        let second = loader.load();

        assert_eq!(reader.reads(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            first.email_mappings.get("a@x.com").map(String::as_str),
            Some("A")
        );
    }

    #[test]
    fn test_stale_at_ttl_rereads() {
        let reader = StubReader::ok(r#"{"defaultCalendarId":"one"}"#);
        let clock = Arc::new(ManualClock::new());
        let loader = loader(reader.clone(), clock.clone());

        assert_eq!(loader.load().default_calendar_id.as_deref(), Some("one"));
        reader.set(r#"{"defaultCalendarId":"two"}"#);
        clock.advance(DEFAULT_TTL);

        assert_eq!(loader.load().default_calendar_id.as_deref(), Some("two"));
        assert_eq!(reader.reads(), 2);
    }

    #[test]
    fn test_invalidate_forces_reread() {
        let reader = StubReader::ok("{}");
        let clock = Arc::new(ManualClock::new());
        let loader = loader(reader.clone(), clock);

        loader.load();
        loader.load();
        assert_eq!(reader.reads(), 1);

        loader.invalidate_cache();
        loader.load();
        assert_eq!(reader.reads(), 2);
    }

    #[test]
    fn test_not_found_yields_defaults() {
        let reader = StubReader::err(io::ErrorKind::NotFound);
        let loader = loader(reader, Arc::new(ManualClock::new()));

        let load = loader.load_with_snapshot();
        assert_eq!(*load.config, PrivacyConfig::default());
        assert_eq!(load.snapshot.origin, ConfigOrigin::Missing);
    }

    #[test]
    fn test_missing_file_is_cached() {
        let reader = StubReader::err(io::ErrorKind::NotFound);
        let loader = loader(reader.clone(), Arc::new(ManualClock::new()));

        loader.load();
        loader.load();
        assert_eq!(reader.reads(), 1);
    }

    #[test]
    fn test_io_error_falls_back() {
        let reader = StubReader::err(io::ErrorKind::PermissionDenied);
        let loader = loader(reader, Arc::new(ManualClock::new()));

        let load = loader.load_with_snapshot();
        assert_eq!(*load.config, PrivacyConfig::default());
        assert!(matches!(load.snapshot.origin, ConfigOrigin::Fallback { .. }));
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let reader = StubReader::ok("{ not json");
        let loader = loader(reader, Arc::new(ManualClock::new()));

        assert_eq!(*loader.load(), PrivacyConfig::default());
        assert!(matches!(
            loader.try_load(),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_object_falls_back() {
        let reader = StubReader::ok("[1, 2, 3]");
        let loader = loader(reader, Arc::new(ManualClock::new()));

        let load = loader.load_with_snapshot();
        assert_eq!(*load.config, PrivacyConfig::default());
        match load.snapshot.origin {
            ConfigOrigin::Fallback { reason } => assert!(reason.contains("an array")),
            other => panic!("unexpected origin: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_tracks_cache_hits() {
        let reader = StubReader::ok(r#"{"version":3}"#);
        let loader = loader(reader, Arc::new(ManualClock::new()));

        let first = loader.load_with_snapshot();
        assert!(!first.snapshot.from_cache);
        assert_eq!(first.snapshot.version, Some(3));
        assert_eq!(
            first.snapshot.content_hash.as_deref().map(str::len),
            Some(64)
        );

        let second = loader.load_with_snapshot();
        assert!(second.snapshot.from_cache);
        assert_eq!(second.snapshot.path_source, PathSource::Provided);
    }

    #[test]
    fn test_path_accessors() {
        let loader = loader(StubReader::ok("{}"), Arc::new(ManualClock::new()));
        assert_eq!(loader.path(), Path::new("/virtual/config.json"));
        assert_eq!(loader.path_source(), PathSource::Provided);
        assert_eq!(loader.ttl(), DEFAULT_TTL);
        assert!(loader.last_snapshot().is_none());
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let before = clock.now();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now() - before, Duration::from_secs(5));
    }

    /// Reader that panics on its first call, then serves fixed content.
    struct PanicOnceReader {
        panicked: AtomicBool,
    }

    impl ConfigReader for PanicOnceReader {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            if !self.panicked.swap(true, Ordering::SeqCst) {
                panic!("reader blew up");
            }
            Ok(r#"{"version":7}"#.to_string())
        }
    }

    /// Counting reader slow enough for callers to pile up behind the lock.
    struct SlowReader {
        reads: AtomicUsize,
    }

    impl ConfigReader for SlowReader {
        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(r#"{"version":5}"#.to_string())
        }
    }

    #[test]
    fn test_load_recovers_from_poisoned_lock() {
        let options = LoaderOptions::default()
            .with_reader(Arc::new(PanicOnceReader {
                panicked: AtomicBool::new(false),
            }))
            .with_diagnostics(DiagnosticPolicy::Silent);
        let loader = ConfigLoader::with_path("/virtual/config.json", options);

        thread::scope(|s| {
            let crashed = s.spawn(|| loader.load()).join();
            assert!(crashed.is_err());
        });
        assert!(loader.cache.is_poisoned());

        assert_eq!(loader.load().version, Some(7));
        assert!(loader.last_snapshot().is_some());
        loader.invalidate_cache();
        assert_eq!(loader.load().version, Some(7));
    }

    #[test]
    fn test_concurrent_stale_loads_share_one_read() {
        const CALLERS: usize = 8;

        let reader = Arc::new(SlowReader {
            reads: AtomicUsize::new(0),
        });
        let clock = Arc::new(ManualClock::new());
        let options = LoaderOptions::default()
            .with_reader(reader.clone())
            .with_clock(clock.clone())
            .with_diagnostics(DiagnosticPolicy::Silent);
        let loader = ConfigLoader::with_path("/virtual/config.json", options);

        loader.load();
        assert_eq!(reader.reads.load(Ordering::SeqCst), 1);
        clock.advance(DEFAULT_TTL);

        let barrier = Barrier::new(CALLERS);
        let configs: Vec<Arc<PrivacyConfig>> = thread::scope(|s| {
            let handles: Vec<_> = (0..CALLERS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        loader.load()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(reader.reads.load(Ordering::SeqCst), 2);
        assert!(configs.iter().all(|c| Arc::ptr_eq(c, &configs[0])));
        assert!(configs.iter().all(|c| c.version == Some(5)));
    }
}
