//! Fixed-weight recommendation ranking.
//!
//! `score = category bonus + popularity - DISTANCE_PENALTY * manhattan distance`,
//! where the bonus is [`CATEGORY_BONUS`] for a category match and zero
//! otherwise. Ties keep catalog order.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::ArtifactRepository;
use crate::models::Artifact;

pub const CATEGORY_BONUS: i64 = 20;
pub const DISTANCE_PENALTY: i64 = 5;
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 4;

/// A ranked candidate and the score that placed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recommendation<'a> {
    pub artifact: &'a Artifact,
    pub score: i64,
}

/// Score `candidate` relative to the artifact being viewed. Arithmetic
/// saturates, so far-off or unvalidated records rank last instead of
/// overflowing.
pub fn recommendation_score(candidate: &Artifact, reference: &Artifact) -> i64 {
    let bonus = if candidate.category == reference.category {
        CATEGORY_BONUS
    } else {
        0
    };
    let distance = candidate
        .coordinates
        .manhattan_distance(reference.coordinates);
    let penalty = i64::try_from(distance)
        .unwrap_or(i64::MAX)
        .saturating_mul(DISTANCE_PENALTY);
    bonus
        .saturating_add(candidate.popularity)
        .saturating_sub(penalty)
}

/// Rank every catalog entry except `reference` and anything in `history`,
/// best first, keeping at most `limit`.
pub fn rank_recommendations<'a, C, S>(
    reference: &Artifact,
    history: &[S],
    catalog: &'a C,
    limit: usize,
) -> Vec<Recommendation<'a>>
where
    C: ArtifactRepository + ?Sized,
    S: AsRef<str>,
{
    let seen: HashSet<&str> = history.iter().map(AsRef::as_ref).collect();
    let mut ranked: Vec<Recommendation<'a>> = catalog
        .artifacts()
        .iter()
        .filter(|candidate| candidate.id != reference.id && !seen.contains(candidate.id.as_str()))
        .map(|candidate| Recommendation {
            artifact: candidate,
            score: recommendation_score(candidate, reference),
        })
        .collect();
    // `sort_by` is stable: equal scores stay in catalog order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// [`rank_recommendations`] without the scores.
pub fn recommend<'a, C, S>(
    reference: &Artifact,
    history: &[S],
    catalog: &'a C,
    limit: usize,
) -> Vec<&'a Artifact>
where
    C: ArtifactRepository + ?Sized,
    S: AsRef<str>,
{
    rank_recommendations(reference, history, catalog, limit)
        .into_iter()
        .map(|rec| rec.artifact)
        .collect()
}
