//! Fuzzy "did you mean" suggestions for misspelled names.

use strsim::jaro_winkler;

/// Minimum similarity for a candidate to be suggested (0.0-1.0).
const SUGGEST_THRESHOLD: f64 = 0.6;

/// Rank `candidates` by similarity to `input` and return at most `limit`.
///
/// Prefix and substring matches rank above plain similarity, mirroring what
/// an author most likely meant when a name is truncated.
pub fn suggest<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let input_lower = input.to_lowercase();
    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let lower = candidate.to_lowercase();
            let score = if input_lower.is_empty() {
                0.0
            } else if lower.starts_with(&input_lower) {
                2.0
            } else if lower.contains(&input_lower) {
                1.5
            } else {
                jaro_winkler(&input_lower, &lower)
            };
            (score >= SUGGEST_THRESHOLD).then_some((candidate, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}
