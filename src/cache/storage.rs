//! Named response caches, one per generation.

use super::CacheError;
use super::http::{Request, Response};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Current on-disk format version.
const STORAGE_VERSION: u8 = 1;

type Cache = HashMap<Request, Response>;

/// Thread-safe set of named caches.
///
/// Writes to the same key overwrite each other; the last one wins.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: RwLock<BTreeMap<String, Cache>>,
}

/// On-disk form of the storage.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStorage {
    version: u8,
    caches: Vec<PersistedCache>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    name: String,
    entries: Vec<PersistedEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    request: Request,
    response: Response,
}

impl CacheStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // No write leaves a map half-updated; poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Cache>> {
        self.caches.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Cache>> {
        self.caches.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the named cache if it does not exist.
    ///
    /// Returns `true` if it was created.
    pub fn open(&self, name: &str) -> bool {
        let mut caches = self.write();
        if caches.contains_key(name) {
            return false;
        }
        caches.insert(name.to_string(), Cache::new());
        true
    }

    /// Whether the named cache exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of all caches, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Delete the named cache and every entry in it.
    ///
    /// Returns `true` if it existed.
    pub fn delete(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Cached response for `request` in the named cache.
    #[must_use]
    pub fn match_request(&self, name: &str, request: &Request) -> Option<Response> {
        self.read()
            .get(name)
            .and_then(|cache| cache.get(request))
            .cloned()
    }

    /// Store a response, creating the cache if needed.
    pub fn put(&self, name: &str, request: Request, response: Response) {
        self.write()
            .entry(name.to_string())
            .or_default()
            .insert(request, response);
    }

    /// Store a response only if the named cache exists.
    ///
    /// Returns `true` if it was stored.
    pub fn put_existing(&self, name: &str, request: Request, response: Response) -> bool {
        match self.write().get_mut(name) {
            Some(cache) => {
                cache.insert(request, response);
                true
            }
            None => false,
        }
    }

    /// Store several responses under one lock, so readers see all or none.
    pub fn put_all(&self, name: &str, entries: impl IntoIterator<Item = (Request, Response)>) {
        let mut caches = self.write();
        let cache = caches.entry(name.to_string()).or_default();
        cache.extend(entries);
    }

    /// Number of entries in the named cache (0 if it does not exist).
    #[must_use]
    pub fn entry_count(&self, name: &str) -> usize {
        self.read().get(name).map_or(0, HashMap::len)
    }

    /// Requests stored in the named cache, sorted by URL then method.
    #[must_use]
    pub fn requests(&self, name: &str) -> Vec<Request> {
        let mut requests: Vec<Request> = self
            .read()
            .get(name)
            .map(|cache| cache.keys().cloned().collect())
            .unwrap_or_default();
        requests.sort_by(|a, b| a.url.cmp(&b.url).then(a.method.as_str().cmp(b.method.as_str())));
        requests
    }

    /// Write every cache to a file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Storage`] if serialization or file I/O fails.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let storage_error = |message: String| CacheError::Storage {
            path: path.to_path_buf(),
            message,
        };

        let persisted = {
            let caches = self.read();
            PersistedStorage {
                version: STORAGE_VERSION,
                caches: caches
                    .iter()
                    .map(|(name, cache)| PersistedCache {
                        name: name.clone(),
                        entries: cache
                            .iter()
                            .map(|(request, response)| PersistedEntry {
                                request: request.clone(),
                                response: response.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            }
        };

        let encoded =
            serde_json::to_vec(&persisted).map_err(|e| storage_error(e.to_string()))?;
        fs::write(path, encoded).map_err(|e| storage_error(e.to_string()))
    }

    /// Read storage previously written by [`CacheStorage::save`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Storage`] if the file cannot be read, is not
    /// valid, or was written by an unsupported format version.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let storage_error = |message: String| CacheError::Storage {
            path: path.to_path_buf(),
            message,
        };

        let bytes = fs::read(path).map_err(|e| storage_error(e.to_string()))?;
        let persisted: PersistedStorage =
            serde_json::from_slice(&bytes).map_err(|e| storage_error(e.to_string()))?;
        if persisted.version != STORAGE_VERSION {
            return Err(storage_error(format!(
                "unsupported format version {} (expected {STORAGE_VERSION})",
                persisted.version
            )));
        }

        let caches = persisted
            .caches
            .into_iter()
            .map(|cache| {
                let entries = cache
                    .entries
                    .into_iter()
                    .map(|entry| (entry.request, entry.response))
                    .collect();
                (cache.name, entries)
            })
            .collect();

        Ok(Self {
            caches: RwLock::new(caches),
        })
    }
}
