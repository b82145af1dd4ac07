//! Request/response cache keyed by endpoint path and parameters.
//!
//! The cache is the only shared mutable state in the client. It is mutated
//! exclusively through [`QueryCache::get_or_fetch`], [`QueryCache::insert`]
//! and the invalidation methods; mutations call
//! [`QueryCache::invalidate_path`] on success so dependent lists refetch.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;

/// Cache identifier: endpoint path plus sorted query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    path: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameters in key order, ready for `reqwest`'s `.query()`.
    pub fn params(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// True when this key belongs to `path` or a sub-path of it.
    fn is_under(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.path == path
            || self
                .path
                .strip_prefix(path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}

/// Request status of one key, mirroring what a view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Error(String),
    Success,
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct CacheState {
    ready: HashMap<QueryKey, Entry>,
    errors: HashMap<QueryKey, String>,
}

/// Keys with a fetch in flight. Kept behind a sync lock so a dropped fetch
/// can clear its key from `Drop`.
type InFlight = Arc<Mutex<HashSet<QueryKey>>>;

fn in_flight(loading: &InFlight) -> std::sync::MutexGuard<'_, HashSet<QueryKey>> {
    loading.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a key as loading for as long as it lives.
struct LoadingGuard {
    loading: InFlight,
    key: QueryKey,
}

impl LoadingGuard {
    fn new(loading: &InFlight, key: QueryKey) -> Self {
        in_flight(loading).insert(key.clone());
        Self {
            loading: loading.clone(),
            key,
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        in_flight(&self.loading).remove(&self.key);
    }
}

#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<RwLock<CacheState>>,
    loading: InFlight,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache").finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`. A value stored under a different type is a
    /// miss.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let state = self.state.read().await;
        state
            .ready
            .get(key)
            .and_then(|entry| entry.clone().downcast::<T>().ok())
    }

    pub async fn insert<T>(&self, key: QueryKey, value: T) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        let value = Arc::new(value);
        let mut state = self.state.write().await;
        state.errors.remove(&key);
        state.ready.insert(key, value.clone());
        value
    }

    /// Return the cached value or run `fetch` and store its result.
    /// Failed fetches are recorded in [`QueryCache::status`] but not cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        E: fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key).await {
            tracing::debug!(key = %key, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(key = %key, "cache miss");
        let _loading = LoadingGuard::new(&self.loading, key.clone());

        match fetch().await {
            Ok(value) => Ok(self.insert(key, value).await),
            Err(e) => {
                self.state.write().await.errors.insert(key, e.to_string());
                Err(e)
            }
        }
    }

    pub async fn status(&self, key: &QueryKey) -> QueryStatus {
        if in_flight(&self.loading).contains(key) {
            return QueryStatus::Loading;
        }
        let state = self.state.read().await;
        if let Some(err) = state.errors.get(key) {
            QueryStatus::Error(err.clone())
        } else if state.ready.contains_key(key) {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        let mut state = self.state.write().await;
        state.ready.remove(key);
        state.errors.remove(key);
    }

    /// Drop every key under `path`, whatever its parameters. Returns how
    /// many entries were removed.
    pub async fn invalidate_path(&self, path: &str) -> usize {
        let mut state = self.state.write().await;
        let before = state.ready.len();
        state.ready.retain(|key, _| !key.is_under(path));
        state.errors.retain(|key, _| !key.is_under(path));
        let removed = before - state.ready.len();
        tracing::debug!(path, removed, "cache invalidated");
        removed
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.ready.clear();
        state.errors.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.ready.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
