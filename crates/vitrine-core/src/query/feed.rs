//! Home-feed, search and dashboard queries.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::catalog::ArtifactRepository;
use crate::models::Artifact;
use crate::query::guards::truncate_query;

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// Size of the popular / recently-added sections of the home feed.
pub const FEED_SECTION_LIMIT: usize = 4;

/// Case-insensitive substring search over name and description, narrowed to
/// `category` unless it is [`ALL_CATEGORIES`]. An empty query matches
/// everything. Results keep catalog order.
pub fn search<'a, C>(catalog: &'a C, query: &str, category: &str) -> Vec<&'a Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    let needle = truncate_query(query).to_lowercase();
    catalog
        .artifacts()
        .iter()
        .filter(|artifact| {
            let matches_text = needle.is_empty()
                || artifact.name.to_lowercase().contains(&needle)
                || artifact.description.to_lowercase().contains(&needle);
            let matches_category = category == ALL_CATEGORIES || artifact.category == category;
            matches_text && matches_category
        })
        .collect()
}

/// Name-only search used by the back-office artifact table.
pub fn search_by_name<'a, C>(catalog: &'a C, query: &str) -> Vec<&'a Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    let needle = truncate_query(query).to_lowercase();
    catalog
        .artifacts()
        .iter()
        .filter(|artifact| artifact.name.to_lowercase().contains(&needle))
        .collect()
}

/// Highest popularity first; ties keep catalog order.
pub fn most_popular<C>(catalog: &C, limit: usize) -> Vec<&Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    let mut ranked: Vec<&Artifact> = catalog.artifacts().iter().collect();
    ranked.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    ranked.truncate(limit);
    ranked
}

/// Newest `date_added` first; ties keep catalog order.
pub fn recently_added<C>(catalog: &C, limit: usize) -> Vec<&Artifact>
where
    C: ArtifactRepository + ?Sized,
{
    let mut ranked: Vec<&Artifact> = catalog.artifacts().iter().collect();
    ranked.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    ranked.truncate(limit);
    ranked
}

/// Distinct categories in first-appearance order.
pub fn categories<C>(catalog: &C) -> Vec<&str>
where
    C: ArtifactRepository + ?Sized,
{
    let distinct: IndexSet<&str> = catalog
        .artifacts()
        .iter()
        .map(|artifact| artifact.category.as_str())
        .collect();
    distinct.into_iter().collect()
}

/// Filter-bar entries: [`ALL_CATEGORIES`] followed by [`categories`].
pub fn category_filters<C>(catalog: &C) -> Vec<&str>
where
    C: ArtifactRepository + ?Sized,
{
    std::iter::once(ALL_CATEGORIES)
        .chain(categories(catalog))
        .collect()
}

/// The default home screen: popular and recent sections plus filters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HomeFeed {
    pub popular: Vec<Artifact>,
    pub recent: Vec<Artifact>,
    pub categories: Vec<String>,
}

pub fn home_feed<C>(catalog: &C, limit: usize) -> HomeFeed
where
    C: ArtifactRepository + ?Sized,
{
    HomeFeed {
        popular: most_popular(catalog, limit).into_iter().cloned().collect(),
        recent: recently_added(catalog, limit).into_iter().cloned().collect(),
        categories: category_filters(catalog)
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Back-office dashboard figures.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_artifacts: usize,
    pub by_category: IndexMap<String, usize>,
    pub by_gallery: IndexMap<String, usize>,
    pub average_popularity: f64,
}

pub fn catalog_stats<C>(catalog: &C) -> CatalogStats
where
    C: ArtifactRepository + ?Sized,
{
    let artifacts = catalog.artifacts();
    let mut by_category: IndexMap<String, usize> = IndexMap::new();
    let mut by_gallery: IndexMap<String, usize> = IndexMap::new();
    for artifact in artifacts {
        *by_category.entry(artifact.category.clone()).or_default() += 1;
        if let Some(gallery) = &artifact.gallery {
            *by_gallery.entry(gallery.clone()).or_default() += 1;
        }
    }
    let average_popularity = if artifacts.is_empty() {
        0.0
    } else {
        let total: i64 = artifacts.iter().map(|a| a.popularity).sum();
        total as f64 / artifacts.len() as f64
    };
    CatalogStats {
        total_artifacts: artifacts.len(),
        by_category,
        by_gallery,
        average_popularity,
    }
}
