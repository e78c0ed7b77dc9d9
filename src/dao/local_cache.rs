//! Synchronous key/value cache holding each collection as one JSON string.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use thiserror::Error;

/// Convenient result alias returning [`CacheError`] failures.
pub type CacheResult<T> = Result<T, CacheError>;

/// Failures raised by a [`LocalCache`] backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory could not be created.
    #[error("failed to create cache directory `{}`", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading an entry failed.
    #[error("failed to read cache entry `{key}`")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    /// Writing an entry failed.
    #[error("failed to write cache entry `{key}`")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
    /// Removing an entry failed.
    #[error("failed to remove cache entry `{key}`")]
    Remove {
        key: String,
        #[source]
        source: io::Error,
    },
    /// The key would escape the cache directory.
    #[error("invalid cache key `{key}`")]
    InvalidKey { key: String },
    /// The value could not be serialised.
    #[error("failed to encode cache entry `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Device-scoped string store. Reads and writes never suspend.
pub trait LocalCache: Send + Sync {
    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> CacheResult<()>;
    /// Forget `key`; a missing key is not an error.
    fn remove(&self, key: &str) -> CacheResult<()>;
}

/// Cache storing one `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open (and create when missing) the cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> CacheResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CacheError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        // Write next to the target then rename so readers never see a torn file.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|source| CacheError::Write {
                key: key.to_string(),
                source,
            })
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Remove {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Process-local cache, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_cache_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path().join("nested")).unwrap();

        assert_eq!(cache.get("players").unwrap(), None);
        cache.set("players", "[]").unwrap();
        assert_eq!(cache.get("players").unwrap().as_deref(), Some("[]"));

        cache.set("players", "[1]").unwrap();
        assert_eq!(cache.get("players").unwrap().as_deref(), Some("[1]"));

        cache.remove("players").unwrap();
        assert_eq!(cache.get("players").unwrap(), None);
        // Removing twice is not an error.
        cache.remove("players").unwrap();
    }

    #[test]
    fn file_cache_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).unwrap();
        assert!(matches!(
            cache.set("../escape", "x"),
            Err(CacheError::InvalidKey { .. })
        ));
        assert!(matches!(cache.get(""), Err(CacheError::InvalidKey { .. })));
    }

    #[test]
    fn memory_cache_behaves_like_a_map() {
        let cache = MemoryCache::new();
        cache.set("schedules", "{}").unwrap();
        assert_eq!(cache.get("schedules").unwrap().as_deref(), Some("{}"));
        cache.remove("schedules").unwrap();
        assert!(cache.get("schedules").unwrap().is_none());
    }
}
