//! Query engine.

use grub_types::{ConfigError, DocId, SearchConfig, SearchError, SearchHit, Trigram};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::analyzer::Analyzer;
use crate::index::scoring::{overlap_score, rank};
use crate::index::types::{Candidate, FoodIndex, INLINE_CANDIDATES};
use crate::store::RecordStore;

/// Scores records by trigram overlap with a query.
///
/// The engine holds no index state; every call is a pure function of the
/// store snapshot and the query string, so one engine can serve any number of
/// concurrent searches. Threshold and cap are fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine {
    analyzer: Analyzer,
    config: SearchConfig,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self {
            analyzer: Analyzer::new(),
            config: SearchConfig::default(),
        }
    }
}

impl QueryEngine {
    /// Creates an engine with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the threshold or cap is out of range.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            analyzer: Analyzer::new(),
            config,
        })
    }

    /// Searches `store` for records whose long description overlaps `query`.
    ///
    /// Hits come back best first: score descending, then id ascending, capped
    /// at `max_results`. A query with no trigrams, or whose trigrams match
    /// nothing, yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`SearchError::StoreReadFailed`] if any store lookup fails.
    /// - [`SearchError::InconsistentIndex`] if a posting names a record the
    ///   store does not hold.
    ///
    /// No partial results are returned on error.
    pub fn search<S>(&self, store: &S, query: &str) -> Result<Vec<SearchHit>, SearchError>
    where
        S: RecordStore + ?Sized,
    {
        let query_trigrams = self.analyzer.trigrams(query);
        let total = query_trigrams.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let mut counts: FxHashMap<DocId, u32> = FxHashMap::default();
        for trigram in &query_trigrams {
            for &doc_id in store.postings(trigram)? {
                *counts.entry(doc_id).or_insert(0) += 1;
            }
        }

        let survivors: SmallVec<[Candidate; INLINE_CANDIDATES]> = counts
            .into_iter()
            .filter(|&(_, matches)| self.config.accepts(overlap_score(matches, total)))
            .map(|(doc_id, matches)| Candidate { doc_id, matches })
            .collect();

        let mut hits = Vec::with_capacity(survivors.len());
        for candidate in &survivors {
            let food = store
                .record(candidate.doc_id)?
                .ok_or(SearchError::InconsistentIndex {
                    doc_id: candidate.doc_id,
                })?;
            hits.push(SearchHit::new(
                food.clone(),
                overlap_score(candidate.matches, total),
            ));
        }

        let matched = hits.len();
        rank(&mut hits, self.config.max_results);

        debug!(
            query,
            query_trigrams = total,
            matched,
            returned = hits.len(),
            "search complete"
        );

        Ok(hits)
    }
}

impl FoodIndex {
    /// Searches this index with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`QueryEngine::search`].
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        QueryEngine::default().search(self, query)
    }

    #[inline(always)]
    pub(crate) fn find_block(&self, trigram: &Trigram) -> Option<usize> {
        self.blocks
            .binary_search_by(|b| b.trigram.cmp(trigram))
            .ok()
    }
}
