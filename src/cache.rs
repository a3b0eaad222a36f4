//! In-process memoization of aggregation results.
//!
//! Results are keyed by query name and arguments and kept for a fixed TTL.
//! Staleness within the TTL is accepted; failures are never memoized.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DashboardError;
use crate::metrics::CACHE_LOOKUPS;
use crate::models::{
    GenrePlatformTotal, GenreTotal, Overview, PlatformTotal, PublisherTotal, RegionTotal, TopGame,
};
use crate::store::SalesStore;

struct Entry {
    stored_at: Instant,
    value: Value,
}

pub struct MemoStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

fn build_cache_key(query: &str, limit: Option<u32>) -> String {
    match limit {
        Some(limit) => format!("{query}:limit_{limit}"),
        None => query.to_string(),
    }
}

impl<S: SalesStore> MemoStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn cached<T, F>(
        &self,
        query: &'static str,
        limit: Option<u32>,
        load: F,
    ) -> Result<T, DashboardError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&S) -> Result<T, DashboardError>,
    {
        let key = build_cache_key(query, limit);

        if let Some(hit) = self.lookup::<T>(&key) {
            CACHE_LOOKUPS.with_label_values(&[query, "hit"]).inc();
            return Ok(hit);
        }
        CACHE_LOOKUPS.with_label_values(&[query, "miss"]).inc();

        let fresh = load(&self.inner)?;
        match serde_json::to_value(&fresh) {
            Ok(value) => {
                self.entries
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(
                        key,
                        Entry {
                            stored_at: Instant::now(),
                            value,
                        },
                    );
            }
            Err(e) => debug!("Not memoizing {key}: {e}"),
        }

        Ok(fresh)
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key)?.stored_at.elapsed() >= self.ttl {
            entries.remove(key);
            return None;
        }

        entries
            .get(key)
            .and_then(|entry| serde_json::from_value(entry.value.clone()).ok())
    }
}

impl<S: SalesStore> SalesStore for MemoStore<S> {
    fn overview(&self) -> Result<Overview, DashboardError> {
        self.cached("overview", None, |s| s.overview())
    }

    fn sales_by_region(&self) -> Result<Vec<RegionTotal>, DashboardError> {
        self.cached("sales_by_region", None, |s| s.sales_by_region())
    }

    fn top_games(&self, limit: u32) -> Result<Vec<TopGame>, DashboardError> {
        self.cached("top_games", Some(limit), |s| s.top_games(limit))
    }

    fn sales_by_genre(&self) -> Result<Vec<GenreTotal>, DashboardError> {
        self.cached("sales_by_genre", None, |s| s.sales_by_genre())
    }

    fn sales_by_platform(&self) -> Result<Vec<PlatformTotal>, DashboardError> {
        self.cached("sales_by_platform", None, |s| s.sales_by_platform())
    }

    fn genre_platform_sales(&self) -> Result<Vec<GenrePlatformTotal>, DashboardError> {
        self.cached("genre_platform_sales", None, |s| s.genre_platform_sales())
    }

    fn top_publishers(&self, limit: u32) -> Result<Vec<PublisherTotal>, DashboardError> {
        self.cached("top_publishers", Some(limit), |s| s.top_publishers(limit))
    }
}
