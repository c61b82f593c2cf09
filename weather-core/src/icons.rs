use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Client;

use crate::error::FetchError;

const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org";

/// Process-lifetime store of downloaded weather icons, keyed by the
/// provider's icon identifier (e.g. `"04d"`). Unbounded; at most a few dozen
/// distinct identifiers exist.
///
/// Cloning yields a handle to the same underlying map, so the UI thread and
/// fetch tasks share one cache. The lock is never held across a network
/// await: two tasks missing on the same identifier may both download it and
/// the later insert wins. That redundant fetch is accepted behavior, not a
/// correctness problem.
#[derive(Debug, Clone)]
pub struct IconCache {
    inner: Arc<Mutex<HashMap<String, Arc<Vec<u8>>>>>,
    base_url: String,
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new()
    }
}

impl IconCache {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ICON_BASE_URL)
    }

    /// Cache against a non-default icon host. Tests point this at a mock
    /// server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Return the cached bytes for `icon_id`, downloading them first on a
    /// miss. A hit performs no network access.
    pub async fn get_or_fetch(
        &self,
        http: &Client,
        icon_id: &str,
    ) -> Result<Arc<Vec<u8>>, FetchError> {
        if let Some(bytes) = self.lookup(icon_id) {
            return Ok(bytes);
        }

        let url = format!("{}/img/wn/{}@2x.png", self.base_url, icon_id);
        tracing::debug!(icon_id, "downloading weather icon");

        let res = http.get(&url).send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let bytes = Arc::new(res.bytes().await?.to_vec());

        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(icon_id.to_string(), bytes.clone());

        Ok(bytes)
    }

    pub fn lookup(&self, icon_id: &str) -> Option<Arc<Vec<u8>>> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(icon_id).cloned()
    }

    pub fn contains(&self, icon_id: &str) -> bool {
        self.lookup(icon_id).is_some()
    }

    pub fn len(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_map() {
        let cache = IconCache::new();
        let other = cache.clone();

        {
            let mut map = cache.inner.lock().unwrap();
            map.insert("01d".to_string(), Arc::new(vec![1, 2, 3]));
        }

        let bytes = other.lookup("01d").expect("clone must see the insert");
        assert_eq!(*bytes, vec![1, 2, 3]);
        assert!(other.contains("01d"));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn lookup_misses_unknown_ids() {
        let cache = IconCache::new();
        assert!(cache.lookup("10n").is_none());
        assert!(cache.is_empty());
    }
}
