//! Locality detection for free-text queries.
//!
//! A locality is "mentioned" when its name occurs anywhere in the query,
//! ignoring case. This is plain substring containment, not word matching:
//!
//! - "wakad 2019 prices" mentions `Wakad`
//! - "Compare AUNDH and Baner" mentions `Aundh` and `Baner`
//! - a short name such as `Ravet` also matches inside "unravettled"
//!
//! The last case is a known false positive and is kept as-is; there is no
//! disambiguation rule to apply instead.

/// Return the known localities that occur in `query`, case-insensitively.
///
/// Output follows the order of `known` (dataset first-appearance order) and
/// contains each name at most once. Blank names never match.
pub fn match_localities<I, S>(query: &str, known: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let haystack = query.to_lowercase();
    let mut matched: Vec<String> = Vec::new();

    for name in known {
        let name = name.as_ref();
        if name.trim().is_empty() {
            continue;
        }
        if haystack.contains(&name.to_lowercase()) && !matched.iter().any(|m| m == name) {
            matched.push(name.to_string());
        }
    }

    matched
}
