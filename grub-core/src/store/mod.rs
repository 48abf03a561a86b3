//! Record storage seam.
//!
//! The query engine reads through [`RecordStore`] and never writes. The built
//! [`FoodIndex`](crate::index::FoodIndex) is the in-memory implementation;
//! tests plug in fixture stores to exercise failure paths.

pub mod catalog;

pub use catalog::Catalog;

use grub_types::{DocId, FoodRecord, StoreError, Trigram};

/// Read access to postings and records.
///
/// Implementations must be safe for concurrent readers; any locking or
/// transaction isolation they need is their own business.
pub trait RecordStore {
    /// Returns the ordinals of records containing `trigram`.
    ///
    /// An unknown trigram yields an empty slice, not an error.
    fn postings(&self, trigram: &Trigram) -> Result<&[DocId], StoreError>;

    /// Returns the record stored under `doc_id`, or `None` if absent.
    fn record(&self, doc_id: DocId) -> Result<Option<&FoodRecord>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    #[inline(always)]
    fn postings(&self, trigram: &Trigram) -> Result<&[DocId], StoreError> {
        (**self).postings(trigram)
    }

    #[inline(always)]
    fn record(&self, doc_id: DocId) -> Result<Option<&FoodRecord>, StoreError> {
        (**self).record(doc_id)
    }
}
