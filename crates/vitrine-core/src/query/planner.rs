//! Query planner with lightweight in-memory response caching.
//!
//! Entries are keyed by tool name, canonical JSON payload and the catalog
//! version token, so a catalog swap naturally misses the old entries. The
//! map doubles as an LRU list: hits move to the back, overflow evicts the
//! front.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::errors::VitrineResult;

pub const DEFAULT_CACHE_ENTRIES: usize = 512;
pub const DEFAULT_CACHE_TTL_SECONDS: f64 = 15.0;
/// Longest accepted entry lifetime: one day.
pub const MAX_CACHE_TTL_SECONDS: f64 = 86_400.0;
const MIN_TTL_SECONDS: f64 = 0.1;

/// Clamp `ttl_seconds` into the supported range. Non-finite input falls
/// back to the default lifetime.
fn ttl_duration(ttl_seconds: f64) -> Duration {
    let fallback = Duration::from_secs_f64(DEFAULT_CACHE_TTL_SECONDS);
    if !ttl_seconds.is_finite() {
        return fallback;
    }
    Duration::try_from_secs_f64(ttl_seconds.clamp(MIN_TTL_SECONDS, MAX_CACHE_TTL_SECONDS))
        .unwrap_or(fallback)
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    CacheHit,
    CacheMiss,
}

/// Timing breakdown for one planner lookup, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryTrace {
    pub lookup_ms: f64,
    pub compute_ms: f64,
    pub total_ms: f64,
    pub version_token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlannerStats {
    pub entries: usize,
    pub max_entries: usize,
}

fn round_ms(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

pub struct QueryPlanner<V> {
    max_entries: usize,
    ttl: Duration,
    cache: Mutex<IndexMap<String, CacheEntry<V>>>,
}

impl<V: Clone> QueryPlanner<V> {
    pub fn new(max_entries: usize, ttl_seconds: f64) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl: ttl_duration(ttl_seconds),
            cache: Mutex::new(IndexMap::new()),
        }
    }

    /// `tool:version:payload`, with the payload's object keys sorted.
    pub fn cache_key(
        tool_name: &str,
        payload: &serde_json::Value,
        version_token: Option<&str>,
    ) -> String {
        let suffix = version_token.unwrap_or("default");
        format!("{tool_name}:{suffix}:{payload}")
    }

    fn evict_expired(cache: &mut IndexMap<String, CacheEntry<V>>, now: Instant) {
        cache.retain(|_, entry| entry.expires_at > now);
    }

    fn evict_over_capacity(&self, cache: &mut IndexMap<String, CacheEntry<V>>) {
        while cache.len() > self.max_entries {
            cache.shift_remove_index(0);
        }
    }

    /// Return the cached value for this request, or run `compute` and cache
    /// its result. Errors from `compute` are returned and not cached.
    pub fn get_or_compute<F>(
        &self,
        tool_name: &str,
        payload: &serde_json::Value,
        version_token: Option<&str>,
        compute: F,
    ) -> VitrineResult<(V, CacheMode, QueryTrace)>
    where
        F: FnOnce() -> VitrineResult<V>,
    {
        let cache_key = Self::cache_key(tool_name, payload, version_token);
        let token = version_token.unwrap_or("default").to_string();
        let lookup_started = Instant::now();

        {
            let mut cache = self.cache.lock();
            Self::evict_expired(&mut cache, Instant::now());
            if let Some(entry) = cache.shift_remove(&cache_key) {
                let value = entry.value.clone();
                // Re-insert at the back for LRU ordering.
                cache.insert(cache_key, entry);
                let lookup_ms = round_ms(lookup_started.elapsed().as_secs_f64() * 1000.0);
                debug!("Planner cache hit for {tool_name}");
                return Ok((
                    value,
                    CacheMode::CacheHit,
                    QueryTrace {
                        lookup_ms,
                        compute_ms: 0.0,
                        total_ms: lookup_ms,
                        version_token: token,
                    },
                ));
            }
        }

        let compute_started = Instant::now();
        let value = compute()?;
        let compute_ms = compute_started.elapsed().as_secs_f64() * 1000.0;

        {
            let mut cache = self.cache.lock();
            cache.insert(
                cache_key,
                CacheEntry {
                    value: value.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
            self.evict_over_capacity(&mut cache);
        }
        debug!("Planner cache miss for {tool_name}");

        let total_ms = lookup_started.elapsed().as_secs_f64() * 1000.0;
        let lookup_ms = (total_ms - compute_ms).max(0.0);
        Ok((
            value,
            CacheMode::CacheMiss,
            QueryTrace {
                lookup_ms: round_ms(lookup_ms),
                compute_ms: round_ms(compute_ms),
                total_ms: round_ms(total_ms),
                version_token: token,
            },
        ))
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> PlannerStats {
        PlannerStats {
            entries: self.cache.lock().len(),
            max_entries: self.max_entries,
        }
    }
}

impl<V: Clone> Default for QueryPlanner<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL_SECONDS)
    }
}
