//! Scoring functions.

use grub_types::SearchHit;

/// Fraction of the query's distinct trigrams found in a candidate.
///
/// `query_trigrams` is never zero here: empty queries return before scoring.
#[inline(always)]
pub(crate) fn overlap_score(matches: u32, query_trigrams: usize) -> f64 {
    f64::from(matches) / query_trigrams.max(1) as f64
}

/// Orders hits best first (score descending, id ascending) and keeps the top
/// `limit`. Truncation happens after the full sort so the cap never drops a
/// better hit in favour of a worse one.
pub(crate) fn rank(hits: &mut Vec<SearchHit>, limit: usize) {
    if hits.len() > limit {
        hits.select_nth_unstable(limit);
        hits.truncate(limit);
    }
    hits.sort_unstable();
}
