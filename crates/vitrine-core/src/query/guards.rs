//! Shared guardrails for caller-supplied query bounds.

pub const MAX_QUERY_LENGTH: usize = 256;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;
pub const MAX_NEARBY_RADIUS: u32 = 32;

/// Bound a requested result count to `0..=maximum`.
pub fn clamp_limit(value: usize, maximum: usize) -> usize {
    value.min(maximum)
}

pub fn clamp_radius(value: u32) -> u32 {
    value.min(MAX_NEARBY_RADIUS)
}

/// Trim and cap a free-text query at [`MAX_QUERY_LENGTH`] characters.
pub fn truncate_query(query: &str) -> &str {
    let stripped = query.trim();
    match stripped.char_indices().nth(MAX_QUERY_LENGTH) {
        Some((cut, _)) => &stripped[..cut],
        None => stripped,
    }
}
