//! Runtime configuration.
//!
//! Defaults describe the reference deployment. Each field can be overridden
//! through a `VITRINE_*` environment variable; a malformed override is a
//! configuration error rather than a silent fallback.

use std::path::PathBuf;

use crate::errors::{VitrineError, VitrineResult};
use crate::models::GridDimensions;
use crate::query::planner::{
    DEFAULT_CACHE_ENTRIES, DEFAULT_CACHE_TTL_SECONDS, MAX_CACHE_TTL_SECONDS,
};
use crate::session::HISTORY_CAPACITY;

pub const ENV_GRID_WIDTH: &str = "VITRINE_GRID_WIDTH";
pub const ENV_GRID_HEIGHT: &str = "VITRINE_GRID_HEIGHT";
pub const ENV_HISTORY_CAPACITY: &str = "VITRINE_HISTORY_CAPACITY";
pub const ENV_CACHE_ENTRIES: &str = "VITRINE_CACHE_ENTRIES";
pub const ENV_CACHE_TTL_SECONDS: &str = "VITRINE_CACHE_TTL_SECONDS";
pub const ENV_CATALOG_PATH: &str = "VITRINE_CATALOG_PATH";

#[derive(Clone, Debug, PartialEq)]
pub struct MuseumConfig {
    pub grid: GridDimensions,
    pub history_capacity: usize,
    pub cache_max_entries: usize,
    pub cache_ttl_seconds: f64,
    /// `None` means the built-in reference collection.
    pub catalog_path: Option<PathBuf>,
}

impl Default for MuseumConfig {
    fn default() -> Self {
        Self {
            grid: GridDimensions::MUSEUM,
            history_capacity: HISTORY_CAPACITY,
            cache_max_entries: DEFAULT_CACHE_ENTRIES,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            catalog_path: None,
        }
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> VitrineResult<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(VitrineError::InvalidConfiguration(format!(
            "{key} must be a positive number, got '{raw}'"
        ))),
    }
}

fn parse_ttl(key: &str, raw: &str) -> VitrineResult<f64> {
    let seconds = parse_positive::<f64>(key, raw)?;
    if !seconds.is_finite() || seconds > MAX_CACHE_TTL_SECONDS {
        return Err(VitrineError::InvalidConfiguration(format!(
            "{key} must be at most {MAX_CACHE_TTL_SECONDS} seconds, got '{raw}'"
        )));
    }
    Ok(seconds)
}

impl MuseumConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> VitrineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; keys missing from it keep defaults.
    pub fn from_lookup<F>(lookup: F) -> VitrineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        let width = match value(ENV_GRID_WIDTH) {
            Some(raw) => parse_positive::<i64>(ENV_GRID_WIDTH, &raw)?,
            None => defaults.grid.width(),
        };
        let height = match value(ENV_GRID_HEIGHT) {
            Some(raw) => parse_positive::<i64>(ENV_GRID_HEIGHT, &raw)?,
            None => defaults.grid.height(),
        };
        let history_capacity = match value(ENV_HISTORY_CAPACITY) {
            Some(raw) => parse_positive::<usize>(ENV_HISTORY_CAPACITY, &raw)?,
            None => defaults.history_capacity,
        };
        let cache_max_entries = match value(ENV_CACHE_ENTRIES) {
            Some(raw) => parse_positive::<usize>(ENV_CACHE_ENTRIES, &raw)?,
            None => defaults.cache_max_entries,
        };
        let cache_ttl_seconds = match value(ENV_CACHE_TTL_SECONDS) {
            Some(raw) => parse_ttl(ENV_CACHE_TTL_SECONDS, &raw)?,
            None => defaults.cache_ttl_seconds,
        };
        let catalog_path = value(ENV_CATALOG_PATH).map(|raw| PathBuf::from(raw.trim()));

        Ok(Self {
            grid: GridDimensions::new(width, height)?,
            history_capacity,
            cache_max_entries,
            cache_ttl_seconds,
            catalog_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::planner::QueryPlanner;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = MuseumConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MuseumConfig::default());
        assert_eq!(config.grid.width(), 10);
        assert_eq!(config.grid.height(), 8);
        assert_eq!(config.history_capacity, 50);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let config = MuseumConfig::from_lookup(lookup(&[
            (ENV_GRID_WIDTH, "12"),
            (ENV_GRID_HEIGHT, " 9 "),
            (ENV_HISTORY_CAPACITY, "5"),
            (ENV_CACHE_ENTRIES, "16"),
            (ENV_CACHE_TTL_SECONDS, "2.5"),
            (ENV_CATALOG_PATH, "/srv/catalog.json"),
        ]))
        .unwrap();
        assert_eq!((config.grid.width(), config.grid.height()), (12, 9));
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.cache_max_entries, 16);
        assert_eq!(config.cache_ttl_seconds, 2.5);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/srv/catalog.json")));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = MuseumConfig::from_lookup(lookup(&[(ENV_GRID_WIDTH, "  ")])).unwrap();
        assert_eq!(config.grid.width(), 10);
    }

    #[test]
    fn test_non_positive_or_garbage_rejected() {
        for (key, raw) in [
            (ENV_GRID_WIDTH, "0"),
            (ENV_GRID_HEIGHT, "-4"),
            (ENV_HISTORY_CAPACITY, "many"),
            (ENV_CACHE_TTL_SECONDS, "0"),
            (ENV_CACHE_TTL_SECONDS, "NaN"),
            (ENV_CACHE_TTL_SECONDS, "inf"),
            (ENV_CACHE_TTL_SECONDS, "1e30"),
        ] {
            let err = MuseumConfig::from_lookup(lookup(&[(key, raw)])).unwrap_err();
            assert!(
                matches!(err, VitrineError::InvalidConfiguration(ref msg) if msg.contains(key)),
                "{key}={raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_longest_ttl_still_builds_a_planner() {
        let config =
            MuseumConfig::from_lookup(lookup(&[(ENV_CACHE_TTL_SECONDS, "86400")])).unwrap();
        assert_eq!(config.cache_ttl_seconds, MAX_CACHE_TTL_SECONDS);
        let planner: QueryPlanner<u32> =
            QueryPlanner::new(config.cache_max_entries, config.cache_ttl_seconds);
        assert_eq!(planner.stats().entries, 0);
    }
}
