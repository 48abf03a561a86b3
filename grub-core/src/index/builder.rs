//! Index building logic.

use std::collections::hash_map::Entry;

use grub_types::{BuildError, DocId, FoodRecord, NutrientDef, NutrientValue, Weight};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::analyzer::{Analyzer, TrigramSet};
use crate::index::types::{FoodIndex, PostingBlock, TempTrigramEntry};
use crate::store::Catalog;

/// Collects records and catalog rows, then builds a [`FoodIndex`] in one pass.
///
/// Nothing is visible to readers until [`IndexBuilder::build`] returns a
/// complete index; a failed build returns an error and no index at all.
///
/// ```
/// use grub_core::index::IndexBuilder;
/// use grub_types::FoodRecord;
///
/// let index = IndexBuilder::new()
///     .records([
///         FoodRecord::new("1", "0100", "cheddar cheese block", "CHEDDAR"),
///         FoodRecord::new("3", "0900", "apple pie", "PIE"),
///     ])
///     .build()
///     .unwrap();
///
/// assert_eq!(index.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct IndexBuilder {
    analyzer: Analyzer,
    records: Vec<FoodRecord>,
    catalog: Catalog,
}

impl IndexBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one food record.
    pub fn record(mut self, record: FoodRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Adds food records.
    pub fn records(mut self, records: impl IntoIterator<Item = FoodRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Adds household weights to the catalog.
    pub fn weights(mut self, weights: impl IntoIterator<Item = Weight>) -> Self {
        for weight in weights {
            self.catalog.insert_weight(weight);
        }
        self
    }

    /// Adds nutrient definitions and per-food nutrient values to the catalog.
    pub fn nutrients(
        mut self,
        defs: impl IntoIterator<Item = NutrientDef>,
        values: impl IntoIterator<Item = NutrientValue>,
    ) -> Self {
        for def in defs {
            self.catalog.insert_nutrient_def(def);
        }
        for value in values {
            self.catalog.insert_nutrient_value(value);
        }
        self
    }

    /// Builds the index.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateId`] if two records share an id, and
    /// [`BuildError::TooManyRecords`] if the ordinals would overflow.
    pub fn build(self) -> Result<FoodIndex, BuildError> {
        let Self {
            analyzer,
            records,
            catalog,
        } = self;

        let ids = FoodIndex::id_map(&records)?;

        let mut entries: Vec<TempTrigramEntry> = Vec::with_capacity(records.len() * 32);
        let mut buf = String::new();
        let mut set = TrigramSet::default();

        for (doc_id, record) in records.iter().enumerate() {
            analyzer.trigrams_into(&record.long_desc, &mut buf, &mut set);
            let doc_id = doc_id as DocId;
            entries.extend(
                set.iter()
                    .map(|&trigram| TempTrigramEntry { trigram, doc_id }),
            );
        }

        Self::sort_trigrams(&mut entries);
        let (blocks, postings) = Self::build_blocks_from_sorted(&entries);

        let index = FoodIndex {
            records,
            ids,
            blocks,
            postings,
            catalog,
        };

        info!(
            records = index.len(),
            trigrams = index.blocks.len(),
            postings = index.postings.len(),
            weights = index.catalog.weight_count(),
            nutrient_values = index.catalog.nutrient_value_count(),
            "food index built"
        );

        Ok(index)
    }

    pub(crate) fn sort_trigrams(entries: &mut [TempTrigramEntry]) {
        entries.sort_unstable_by(|a, b| {
            a.trigram
                .cmp(&b.trigram)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
    }

    /// Collapses sorted `(trigram, doc)` entries into blocks over one
    /// contiguous postings array, dropping repeated docs within a block.
    pub(crate) fn build_blocks_from_sorted(
        entries: &[TempTrigramEntry],
    ) -> (Vec<PostingBlock>, Vec<DocId>) {
        let Some(first) = entries.first() else {
            return (Vec::new(), Vec::new());
        };

        let mut blocks: Vec<PostingBlock> = Vec::new();
        let mut postings: Vec<DocId> = Vec::with_capacity(entries.len());

        let mut current_trigram = first.trigram;
        let mut current_offset = 0u32;
        let mut current_len = 0u32;
        let mut last_doc_id: Option<DocId> = None;

        for entry in entries {
            if entry.trigram != current_trigram {
                blocks.push(PostingBlock {
                    trigram: current_trigram,
                    offset: current_offset,
                    len: current_len,
                });
                current_offset += current_len;
                current_trigram = entry.trigram;
                current_len = 0;
                last_doc_id = None;
            }

            if last_doc_id != Some(entry.doc_id) {
                postings.push(entry.doc_id);
                current_len += 1;
                last_doc_id = Some(entry.doc_id);
            }
        }

        blocks.push(PostingBlock {
            trigram: current_trigram,
            offset: current_offset,
            len: current_len,
        });

        debug!(blocks = blocks.len(), "posting blocks assembled");
        (blocks, postings)
    }
}

impl FoodIndex {
    /// Maps ids to ordinals, rejecting duplicates.
    pub(crate) fn id_map(records: &[FoodRecord]) -> Result<FxHashMap<String, DocId>, BuildError> {
        if DocId::try_from(records.len()).is_err() {
            return Err(BuildError::TooManyRecords {
                count: records.len(),
            });
        }

        let mut ids = FxHashMap::default();
        ids.reserve(records.len());
        for (doc_id, record) in records.iter().enumerate() {
            match ids.entry(record.id.clone()) {
                Entry::Occupied(_) => {
                    return Err(BuildError::DuplicateId {
                        id: record.id.clone(),
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(doc_id as DocId);
                }
            }
        }
        Ok(ids)
    }

    #[inline(always)]
    pub(crate) fn block_postings<'a>(block: &PostingBlock, postings: &'a [DocId]) -> &'a [DocId] {
        let start = block.offset as usize;
        &postings[start..start + block.len as usize]
    }
}
