//! Vitrine core library: the spatial artifact catalog behind the museum
//! explorer app.
//!
//! The crate owns the artifact catalog and everything derived from it: the
//! floor-plan grid, proximity lookups, recommendation ranking, home-feed
//! queries, visitor sessions and the admin back office. Storage is pluggable
//! (reference data, JSON file, SQLite). With the `python` feature it is also
//! built as a Python extension module (`_vitrine_core`) via PyO3.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod query;
pub mod service;
pub mod session;
pub mod store;

#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _vitrine_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _vitrine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::MuseumCore>()?;

    // -- Floor plan ---------------------------------------------------------
    m.add("MUSEUM_GRID_WIDTH", models::MUSEUM_GRID_WIDTH)?;
    m.add("MUSEUM_GRID_HEIGHT", models::MUSEUM_GRID_HEIGHT)?;
    m.add("MAX_POPULARITY", models::MAX_POPULARITY)?;

    // -- Query defaults -----------------------------------------------------
    m.add("DEFAULT_NEARBY_RADIUS", query::proximity::DEFAULT_NEARBY_RADIUS)?;
    m.add(
        "DEFAULT_RECOMMENDATION_LIMIT",
        query::recommend::DEFAULT_RECOMMENDATION_LIMIT,
    )?;
    m.add("CATEGORY_BONUS", query::recommend::CATEGORY_BONUS)?;
    m.add("DISTANCE_PENALTY", query::recommend::DISTANCE_PENALTY)?;
    m.add("FEED_SECTION_LIMIT", query::feed::FEED_SECTION_LIMIT)?;
    m.add("NEARBY_PREVIEW_LIMIT", service::NEARBY_PREVIEW_LIMIT)?;
    m.add("HISTORY_CAPACITY", session::HISTORY_CAPACITY)?;

    // -- Guards ---------------------------------------------------------------
    m.add("MAX_QUERY_LENGTH", query::guards::MAX_QUERY_LENGTH)?;
    m.add(
        "MAX_RECOMMENDATION_LIMIT",
        query::guards::MAX_RECOMMENDATION_LIMIT,
    )?;
    m.add("MAX_NEARBY_RADIUS", query::guards::MAX_NEARBY_RADIUS)?;

    Ok(())
}
