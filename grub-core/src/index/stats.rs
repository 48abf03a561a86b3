//! Statistics and IndexStats.

use grub_types::DocId;
use serde::Serialize;

use crate::index::types::{FoodIndex, PostingBlock};

/// A snapshot of index statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of food records.
    pub num_records: usize,
    /// Number of unique trigrams.
    pub num_trigrams: usize,
    /// Total number of postings.
    pub total_postings: usize,
    /// Length of the longest posting list.
    pub longest_posting_list: usize,
    /// Number of household weights in the catalog.
    pub num_weights: usize,
    /// Number of nutrient definitions in the catalog.
    pub num_nutrient_defs: usize,
    /// Number of nutrient values in the catalog.
    pub num_nutrient_values: usize,
}

impl FoodIndex {
    /// Returns index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_records: self.records.len(),
            num_trigrams: self.blocks.len(),
            total_postings: self.postings.len(),
            longest_posting_list: self
                .blocks
                .iter()
                .map(|b| b.len as usize)
                .max()
                .unwrap_or(0),
            num_weights: self.catalog.weight_count(),
            num_nutrient_defs: self.catalog.nutrient_def_count(),
            num_nutrient_values: self.catalog.nutrient_value_count(),
        }
    }
}

impl IndexStats {
    /// Returns approximate memory used by the posting structures in bytes.
    pub fn postings_memory_bytes(&self) -> usize {
        self.num_trigrams * std::mem::size_of::<PostingBlock>()
            + self.total_postings * std::mem::size_of::<DocId>()
    }

    /// Mean number of postings per trigram.
    pub fn mean_posting_list(&self) -> f64 {
        if self.num_trigrams == 0 {
            0.0
        } else {
            self.total_postings as f64 / self.num_trigrams as f64
        }
    }
}

impl core::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} foods, {} trigrams, {} postings (mean {:.1}, max {}, ~{} KiB), {} weights, {} nutrient defs, {} nutrient values",
            self.num_records,
            self.num_trigrams,
            self.total_postings,
            self.mean_posting_list(),
            self.longest_posting_list,
            self.postings_memory_bytes() / 1024,
            self.num_weights,
            self.num_nutrient_defs,
            self.num_nutrient_values
        )
    }
}
