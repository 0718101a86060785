#![forbid(unsafe_code)]

//! Preference storage.
//!
//! Preferences are plain string pairs (`"theme" -> "dark"`). A
//! [`StateRegistry`] caches them in memory and writes them through a
//! [`StorageBackend`] only on [`flush`](StateRegistry::flush), and only if
//! something actually changed.
//!
//! Backends:
//! - [`MemoryStorage`]: process-local, for tests and `--no-persist`.
//! - `FileStorage`: one JSON file, behind the `state-persistence` feature.
//!
//! Nothing in here panics on bad input. A missing file is an empty store, a
//! malformed one is a [`StorageError::Serialization`], and a file written by
//! a newer format is ignored with a warning.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Stored preferences, ordered by key so files diff cleanly.
pub type Entries = BTreeMap<String, String>;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    /// The stored data could not be encoded or decoded.
    Serialization(String),
    /// In-process state is unusable (a lock was poisoned).
    Corruption(String),
    /// The backend cannot be used at all, e.g. its path is a directory.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Serialization(msg) => write!(f, "serialization error: {msg}"),
            Self::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            Self::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

fn poisoned(what: &str) -> StorageError {
    StorageError::Corruption(format!("{what} lock poisoned"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend trait
// ─────────────────────────────────────────────────────────────────────────────

/// Where preferences live between sessions.
///
/// `save_all` replaces everything stored; it never merges.
pub trait StorageBackend: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    /// Everything stored so far; empty when nothing was ever saved.
    fn load_all(&self) -> StorageResult<Entries>;

    fn save_all(&self, entries: &Entries) -> StorageResult<()>;

    /// Forget everything stored.
    fn clear(&self) -> StorageResult<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_all(&self) -> StorageResult<Entries> {
        (**self).load_all()
    }

    fn save_all(&self, entries: &Entries) -> StorageResult<()> {
        (**self).save_all(entries)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryStorage
// ─────────────────────────────────────────────────────────────────────────────

/// Backend that keeps preferences for the lifetime of the process.
///
/// Share it through an `Arc` to inspect what a registry flushed.
#[derive(Default)]
pub struct MemoryStorage {
    saved: RwLock<Entries>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `entries`, as if a previous session saved them.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let saved = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            saved: RwLock::new(saved),
        }
    }

    /// The value last saved under `key`.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<String> {
        self.saved.read().ok()?.get(key).cloned()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn load_all(&self) -> StorageResult<Entries> {
        self.saved
            .read()
            .map(|saved| saved.clone())
            .map_err(|_| poisoned("memory storage"))
    }

    fn save_all(&self, entries: &Entries) -> StorageResult<()> {
        let mut saved = self.saved.write().map_err(|_| poisoned("memory storage"))?;
        saved.clone_from(entries);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.saved
            .write()
            .map_err(|_| poisoned("memory storage"))?
            .clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.saved.read().map_or(0, |saved| saved.len());
        f.debug_struct("MemoryStorage").field("entries", &len).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FileStorage
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::{Entries, StorageBackend, StorageError, StorageResult};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fmt;
    use std::fs;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    const FORMAT_VERSION: u32 = 1;

    /// Layout of the preferences file.
    ///
    /// ```json
    /// { "format_version": 1, "entries": { "theme": "dark" } }
    /// ```
    ///
    /// Values are read as raw JSON so a single non-string entry is dropped
    /// instead of failing the whole file.
    #[derive(Serialize, Deserialize)]
    struct Document {
        format_version: u32,
        #[serde(default)]
        entries: BTreeMap<String, serde_json::Value>,
    }

    /// JSON file backend.
    ///
    /// Saves go to a sibling `*.json.tmp` file that is synced and then
    /// renamed over the target, so a crash mid-save keeps the old file.
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Storage at `path`. Neither the file nor its directory needs to exist yet.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Storage at [`default_state_path`] for `app_name`.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            Self::new(default_state_path(app_name))
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            self.path.with_extension("json.tmp")
        }

        fn ensure_not_dir(&self) -> StorageResult<()> {
            if self.path.is_dir() {
                return Err(StorageError::Unavailable(format!(
                    "{} is a directory",
                    self.path.display()
                )));
            }
            Ok(())
        }
    }

    /// `$XDG_STATE_HOME/<app>/state.json`, then `~/.local/state/<app>/state.json`,
    /// then `./state.json`.
    #[must_use]
    pub fn default_state_path(app_name: &str) -> PathBuf {
        let non_empty = |var: &str| std::env::var_os(var).filter(|v| !v.is_empty());
        let base = non_empty("XDG_STATE_HOME").map(PathBuf::from).or_else(|| {
            non_empty("HOME").map(|home| Path::new(&home).join(".local").join("state"))
        });
        match base {
            Some(base) => base.join(app_name).join("state.json"),
            None => PathBuf::from("state.json"),
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "file"
        }

        fn load_all(&self) -> StorageResult<Entries> {
            self.ensure_not_dir()?;
            let raw = match fs::read_to_string(&self.path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
                Err(e) => return Err(e.into()),
            };
            let doc: Document = serde_json::from_str(&raw).map_err(|e| {
                StorageError::Serialization(format!("{}: {e}", self.path.display()))
            })?;
            if doc.format_version != FORMAT_VERSION {
                tracing::warn!(
                    path = %self.path.display(),
                    found = doc.format_version,
                    supported = FORMAT_VERSION,
                    "unsupported preferences format, starting empty"
                );
                return Ok(Entries::new());
            }
            let entries = doc
                .entries
                .into_iter()
                .filter_map(|(key, value)| match value {
                    serde_json::Value::String(s) => Some((key, s)),
                    other => {
                        tracing::warn!(%key, value = %other, "dropping non-string preference");
                        None
                    }
                })
                .collect();
            Ok(entries)
        }

        fn save_all(&self, entries: &Entries) -> StorageResult<()> {
            self.ensure_not_dir()?;
            if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            let doc = Document {
                format_version: FORMAT_VERSION,
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
                    .collect(),
            };
            let json = serde_json::to_vec_pretty(&doc)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;

            let tmp = self.temp_path();
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
            drop(file);
            fs::rename(&tmp, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = entries.len(),
                "preferences saved"
            );
            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            }
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_tuple("FileStorage").field(&self.path).finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::{FileStorage, default_state_path};

// ─────────────────────────────────────────────────────────────────────────────
// StateRegistry
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Cache {
    entries: Entries,
    dirty: bool,
}

/// In-memory view of the stored preferences.
///
/// ```ignore
/// let registry = StateRegistry::in_memory();
/// registry.load()?;
/// registry.set("theme", "dark");
/// registry.flush()?;
/// ```
pub struct StateRegistry {
    backend: Box<dyn StorageBackend>,
    cache: Mutex<Cache>,
}

impl StateRegistry {
    /// Registry over `backend`. Starts empty until [`load`](Self::load).
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: Mutex::new(Cache::default()),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    #[cfg(feature = "state-persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    fn cache(&self) -> StorageResult<MutexGuard<'_, Cache>> {
        self.cache.lock().map_err(|_| poisoned("registry"))
    }

    /// Replace the cache with whatever the backend holds.
    ///
    /// On error the cache is left untouched. Returns the number of entries.
    pub fn load(&self) -> StorageResult<usize> {
        let entries = self.backend.load_all()?;
        let count = entries.len();
        *self.cache()? = Cache {
            entries,
            dirty: false,
        };
        tracing::debug!(backend = self.backend.name(), count, "preferences loaded");
        Ok(count)
    }

    /// Save the cache if it changed since the last load or flush.
    ///
    /// `Ok(false)` means there was nothing to write. A failed save keeps the
    /// registry dirty so a later flush retries.
    pub fn flush(&self) -> StorageResult<bool> {
        let mut cache = self.cache()?;
        if !cache.dirty {
            return Ok(false);
        }
        self.backend.save_all(&cache.entries)?;
        cache.dirty = false;
        Ok(true)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.cache().ok()?.entries.get(key).cloned()
    }

    /// Cache `value` under `key`. Setting the current value is a no-op.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let Ok(mut cache) = self.cache() else {
            tracing::warn!(backend = self.backend.name(), "registry lock poisoned, dropping set");
            return;
        };
        let value = value.into();
        let previous = cache.entries.insert(key.into(), value.clone());
        if previous.as_ref() != Some(&value) {
            cache.dirty = true;
        }
    }

    /// Empty both the cache and the backend.
    pub fn clear(&self) -> StorageResult<()> {
        self.backend.clear()?;
        *self.cache()? = Cache::default();
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache().map_or(0, |c| c.entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether there are changes a [`flush`](Self::flush) would write.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.cache().is_ok_and(|c| c.dirty)
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRegistry")
            .field("backend", &self.backend.name())
            .field("entries", &self.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
