//! Index types and constants.

use grub_types::{DocId, FoodRecord, Trigram};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::store::Catalog;

/// Inline capacity for surviving candidates before spilling to the heap.
pub const INLINE_CANDIDATES: usize = 64;

/// One trigram's slice of the shared postings array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingBlock {
    pub trigram: Trigram,
    pub offset: u32,
    pub len: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub doc_id: DocId,
    pub matches: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct TempTrigramEntry {
    pub trigram: Trigram,
    pub doc_id: DocId,
}

/// An immutable, fully built food index.
///
/// Holds the records, the trigram postings over their long descriptions, and
/// the weight/nutrient catalog. Built once by
/// [`IndexBuilder`](crate::index::IndexBuilder) and never mutated afterwards,
/// so it can be shared across threads behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct FoodIndex {
    /// Records by ordinal.
    pub(crate) records: Vec<FoodRecord>,
    /// Food id to ordinal.
    pub(crate) ids: FxHashMap<String, DocId>,
    /// Posting blocks sorted by trigram.
    pub(crate) blocks: Vec<PostingBlock>,
    /// All posting lists back to back; each block's slice is sorted and unique.
    pub(crate) postings: Vec<DocId>,
    pub(crate) catalog: Catalog,
}

impl FoodIndex {
    /// Returns the number of records in the index.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the index holds no records.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the weight and nutrient catalog.
    #[inline(always)]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
