//! Fuzzy "did you mean" suggestions for unknown dependency names.

/// At most this many suggestions are returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// Fraction of positions that must agree over the shorter name.
const POSITIONAL_MATCH_THRESHOLD: f64 = 0.7;

/// Whether `candidate` looks like a plausible intended `name`.
///
/// Case-insensitive. Either name contains the other, or at least 70% of
/// the characters line up position by position over the shorter length.
pub fn is_similar(name: &str, candidate: &str) -> bool {
    let a = name.to_lowercase();
    let b = candidate.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(&b) || b.contains(&a) {
        return true;
    }

    let shorter = a.chars().count().min(b.chars().count());
    let matching = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    matching as f64 / shorter as f64 >= POSITIONAL_MATCH_THRESHOLD
}

/// Similar candidates, closest first by edit distance, then by name.
pub fn suggest<'a, I>(name: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lower = name.to_lowercase();
    let mut ranked: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|candidate| is_similar(name, candidate))
        .map(|candidate| {
            (
                levenshtein::levenshtein(&lower, &candidate.to_lowercase()),
                candidate,
            )
        })
        .collect();
    ranked.sort();
    ranked.dedup_by(|a, b| a.1 == b.1);

    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
