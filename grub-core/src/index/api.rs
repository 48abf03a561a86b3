//! Public API for retrieving records, and the in-memory [`RecordStore`].

use grub_types::{DocId, FoodRecord, StoreError, Trigram};

use crate::index::types::FoodIndex;
use crate::store::RecordStore;

impl FoodIndex {
    /// Retrieves a food by its id.
    #[inline(always)]
    pub fn get(&self, id: &str) -> Option<&FoodRecord> {
        self.ids
            .get(id)
            .and_then(|&doc_id| self.records.get(doc_id as usize))
    }

    /// Retrieves a food by its ordinal in this index.
    #[inline(always)]
    pub fn get_by_ordinal(&self, doc_id: DocId) -> Option<&FoodRecord> {
        self.records.get(doc_id as usize)
    }

    /// Iterates over all foods in load order.
    pub fn iter(&self) -> impl Iterator<Item = &FoodRecord> {
        self.records.iter()
    }

    /// Returns the ordinals of foods whose description contains `trigram`.
    pub fn trigram_postings(&self, trigram: &Trigram) -> &[DocId] {
        match self.find_block(trigram) {
            Some(idx) => Self::block_postings(&self.blocks[idx], &self.postings),
            None => &[],
        }
    }
}

impl RecordStore for FoodIndex {
    #[inline(always)]
    fn postings(&self, trigram: &Trigram) -> Result<&[DocId], StoreError> {
        Ok(self.trigram_postings(trigram))
    }

    #[inline(always)]
    fn record(&self, doc_id: DocId) -> Result<Option<&FoodRecord>, StoreError> {
        Ok(self.get_by_ordinal(doc_id))
    }
}
