use std::collections::HashSet;

use _vitrine_core::catalog::reference_artifacts;
use _vitrine_core::models::{Artifact, CellKind, Coordinates};
use _vitrine_core::query::grid::build_grid;
use _vitrine_core::query::proximity::nearby;
use _vitrine_core::query::recommend::{rank_recommendations, recommend, recommendation_score};
use proptest::prelude::*;

const CATEGORIES: [&str; 3] = ["Greek", "Asian", "Medieval"];

/// Catalogs of up to 24 artifacts with ids `a0..`, possibly sharing cells
/// and possibly lying outside a 12x12 hall.
fn catalog_strategy() -> impl Strategy<Value = Vec<Artifact>> {
    prop::collection::vec((-2i64..14, -2i64..14, 0i64..=100, 0usize..3), 1..24).prop_map(
        |rows| {
            let template = reference_artifacts()[0].clone();
            rows.into_iter()
                .enumerate()
                .map(|(n, (x, y, popularity, category))| {
                    let mut artifact = template.clone();
                    artifact.id = format!("a{n}");
                    artifact.coordinates = Coordinates::new(x, y);
                    artifact.popularity = popularity;
                    artifact.category = CATEGORIES[category].to_string();
                    artifact
                })
                .collect()
        },
    )
}

fn ids(found: &[&Artifact]) -> Vec<String> {
    found.iter().map(|a| a.id.clone()).collect()
}

proptest! {
    #[test]
    fn grid_has_one_cell_per_coordinate(
        catalog in catalog_strategy(),
        width in 1i64..16,
        height in 1i64..16,
    ) {
        let grid = build_grid(&catalog, width, height).unwrap();
        prop_assert_eq!(grid.cell_count(), (width * height) as usize);
        prop_assert_eq!(grid.cells.len(), height as usize);
        let mut seen = HashSet::new();
        for (y, row) in grid.cells.iter().enumerate() {
            prop_assert_eq!(row.len(), width as usize);
            for (x, cell) in row.iter().enumerate() {
                prop_assert_eq!((cell.x, cell.y), (x as i64, y as i64));
                prop_assert!(seen.insert((cell.x, cell.y)));
            }
        }
    }

    #[test]
    fn in_bounds_artifacts_are_placed(catalog in catalog_strategy()) {
        let grid = build_grid(&catalog, 12, 12).unwrap();
        for artifact in &catalog {
            let Coordinates { x, y } = artifact.coordinates;
            if !(0..12).contains(&x) || !(0..12).contains(&y) {
                continue;
            }
            let cell = &grid.cells[y as usize][x as usize];
            prop_assert_eq!(cell.kind, CellKind::Artifact);
            // First catalog entry at a shared cell wins.
            let first = catalog
                .iter()
                .find(|other| other.coordinates == artifact.coordinates)
                .unwrap();
            prop_assert_eq!(cell.artifact_id.as_deref(), Some(first.id.as_str()));
        }
    }

    #[test]
    fn empty_origin_is_the_entrance(catalog in catalog_strategy()) {
        let grid = build_grid(&catalog, 12, 12).unwrap();
        let origin_taken = catalog.iter().any(|a| a.coordinates == Coordinates::new(0, 0));
        let origin = &grid.cells[0][0];
        if origin_taken {
            prop_assert_eq!(origin.kind, CellKind::Artifact);
        } else {
            prop_assert_eq!(origin.kind, CellKind::Entrance);
        }
    }

    #[test]
    fn nearby_never_returns_the_center(catalog in catalog_strategy(), radius in 0u32..20) {
        for artifact in &catalog {
            let found = nearby(&catalog, artifact.coordinates.x, artifact.coordinates.y, radius);
            prop_assert!(found.iter().all(|a| a.coordinates != artifact.coordinates));
        }
    }

    #[test]
    fn nearby_grows_with_radius(
        catalog in catalog_strategy(),
        x in -3i64..15,
        y in -3i64..15,
        r1 in 0u32..8,
        extra in 0u32..8,
    ) {
        let inner: HashSet<String> = ids(&nearby(&catalog, x, y, r1)).into_iter().collect();
        let outer: HashSet<String> = ids(&nearby(&catalog, x, y, r1 + extra)).into_iter().collect();
        prop_assert!(inner.is_subset(&outer));
    }

    #[test]
    fn recommendations_skip_reference_and_history(
        catalog in catalog_strategy(),
        pick in any::<prop::sample::Index>(),
        seen in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
        limit in 0usize..30,
    ) {
        let reference = &catalog[pick.index(catalog.len())];
        let history: Vec<String> = seen
            .iter()
            .map(|i| catalog[i.index(catalog.len())].id.clone())
            .collect();
        let found = recommend(reference, &history, &catalog, limit);
        prop_assert!(found.iter().all(|a| a.id != reference.id));
        prop_assert!(found.iter().all(|a| !history.contains(&a.id)));
    }

    #[test]
    fn recommendations_sorted_with_catalog_order_ties(
        catalog in catalog_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let reference = &catalog[pick.index(catalog.len())];
        let no_history: &[&str] = &[];
        let ranked = rank_recommendations(reference, no_history, &catalog, catalog.len());
        let position = |id: &str| catalog.iter().position(|a| a.id == id).unwrap();
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(position(&pair[0].artifact.id) < position(&pair[1].artifact.id));
            }
        }
        for rec in &ranked {
            prop_assert_eq!(rec.score, recommendation_score(rec.artifact, reference));
        }
    }

    #[test]
    fn recommendation_count_is_bounded(
        catalog in catalog_strategy(),
        pick in any::<prop::sample::Index>(),
        seen in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
        limit in 0usize..30,
    ) {
        let reference = &catalog[pick.index(catalog.len())];
        let history: HashSet<String> = seen
            .iter()
            .map(|i| catalog[i.index(catalog.len())].id.clone())
            .collect();
        let history: Vec<String> = history.into_iter().collect();
        let eligible = catalog
            .iter()
            .filter(|a| a.id != reference.id && !history.contains(&a.id))
            .count();
        let found = recommend(reference, &history, &catalog, limit);
        prop_assert_eq!(found.len(), limit.min(eligible));
    }
}
