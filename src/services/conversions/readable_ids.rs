//! Human-readable ids for items created from RFQ lines.

use std::collections::HashSet;

/// `"{part}"` or `"{part}-{revision}"` when a revision is given.
pub fn readable_id_candidate(customer_part_id: &str, revision: Option<&str>) -> String {
    let part = customer_part_id.trim();
    match revision.map(str::trim).filter(|r| !r.is_empty()) {
        Some(revision) => format!("{}-{}", part, revision),
        None => part.to_string(),
    }
}

/// Picks a unique id for each candidate, in order. A candidate already in
/// `taken`, or picked earlier in the batch, becomes `"{candidate} (N)"` with
/// the smallest free `N` starting at 1.
pub fn assign_readable_ids(candidates: &[String], taken: &HashSet<String>) -> Vec<String> {
    let mut used = taken.clone();
    candidates
        .iter()
        .map(|candidate| {
            let readable_id = if used.contains(candidate) {
                (1u32..)
                    .map(|n| format!("{} ({})", candidate, n))
                    .find(|suffixed| !used.contains(suffixed))
                    .unwrap_or_else(|| candidate.clone())
            } else {
                candidate.clone()
            };
            used.insert(readable_id.clone());
            readable_id
        })
        .collect()
}
