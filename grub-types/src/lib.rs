//! Core types and errors for the grub food search engine.
//!
//! This crate holds the values that cross crate boundaries: the USDA record
//! types, the trigram key, ranked search hits, search configuration, and the
//! error enums surfaced by the engine. Keeping them here lets the core and the
//! command-line front end agree on one set of types without depending on each
//! other's internals.

#![warn(missing_docs)]

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dense record ordinal inside one built index.
///
/// Ordinals are assigned in load order and are only meaningful for the index
/// that assigned them. The stable external identifier is [`FoodRecord::id`].
pub type DocId = u32;

/// Minimum similarity for a candidate to count as a match.
///
/// A candidate must contain at least this fraction of the query's distinct
/// trigrams. At 0.70 a seven-trigram query such as `"cheese"` needs five of
/// its seven grams present in the description.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.70;

/// Maximum number of hits a single search returns.
///
/// Applied after scoring and sorting, so the cap always keeps the best hits.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// A food description from the USDA `FOOD_DES` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Nutrient databank number, unique per food.
    pub id: String,
    /// Food group code.
    pub food_group_id: String,
    /// Full description; this is the text the search index covers.
    pub long_desc: String,
    /// Abbreviated description.
    pub short_desc: String,
    /// Other names commonly used for the food.
    #[serde(default)]
    pub common_names: String,
    /// Manufacturer, for branded items.
    #[serde(default)]
    pub manufacturer: String,
    /// Whether the food has a complete profile for the FNDDS survey nutrients.
    #[serde(default)]
    pub survey: bool,
    /// Description of inedible parts.
    #[serde(default)]
    pub refuse_desc: String,
    /// Percentage of refuse.
    #[serde(default)]
    pub refuse: Option<f64>,
    /// Scientific name of the food item.
    #[serde(default)]
    pub scientific_name: String,
    /// Factor for converting nitrogen to protein.
    #[serde(default)]
    pub nitrogen_factor: Option<f64>,
    /// Calorie factor for protein.
    #[serde(default)]
    pub protein_factor: Option<f64>,
    /// Calorie factor for fat.
    #[serde(default)]
    pub fat_factor: Option<f64>,
    /// Calorie factor for carbohydrate.
    #[serde(default)]
    pub carbohydrate_factor: Option<f64>,
}

impl FoodRecord {
    /// Creates a record with only the descriptive fields set.
    pub fn new(
        id: impl Into<String>,
        food_group_id: impl Into<String>,
        long_desc: impl Into<String>,
        short_desc: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            food_group_id: food_group_id.into(),
            long_desc: long_desc.into(),
            short_desc: short_desc.into(),
            common_names: String::new(),
            manufacturer: String::new(),
            survey: false,
            refuse_desc: String::new(),
            refuse: None,
            scientific_name: String::new(),
            nitrogen_factor: None,
            protein_factor: None,
            fat_factor: None,
            carbohydrate_factor: None,
        }
    }
}

/// A household measure for a food, from the `WEIGHT` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    /// Food this measure belongs to.
    pub food_id: String,
    /// Sequence number within the food.
    pub seq: String,
    /// Unit amount, e.g. `1.0` for "1 cup".
    pub amount: Option<f64>,
    /// Measure description, e.g. "cup, diced".
    pub description: String,
    /// Gram weight of the measure.
    pub grams: Option<f64>,
    /// Number of data points.
    pub data_points: Option<f64>,
    /// Standard deviation.
    pub std_dev: Option<f64>,
}

/// A nutrient definition from the `NUTR_DEF` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientDef {
    /// Nutrient number.
    pub id: String,
    /// Unit of measure, e.g. "g" or "mg".
    pub units: String,
    /// INFOODS tag name.
    pub tag_name: String,
    /// Human-readable nutrient name.
    pub description: String,
    /// Number of decimal places the value is rounded to.
    pub decimals: String,
    /// Display sort order.
    pub sort: Option<f64>,
}

/// A nutrient value for one food, from the `NUT_DATA` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientValue {
    /// Food this value belongs to.
    pub food_id: String,
    /// Nutrient definition this value measures.
    pub nutrient_id: String,
    /// Amount in 100 grams, edible portion.
    pub value: Option<f64>,
    /// Number of data points.
    pub data_points: Option<f64>,
    /// Standard error of the mean.
    pub std_error: Option<f64>,
}

/// A nutrient value joined with its definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    /// Nutrient name.
    pub name: String,
    /// Amount in 100 grams, if reported.
    pub value: Option<f64>,
    /// Unit of measure.
    pub unit: String,
}

/// A three-character index key.
///
/// Each word of normalized text yields one trigram per character from a
/// sliding window seeded with two [`Trigram::PAD`] slots, plus one trailing
/// gram whose last slot is [`Trigram::BOUNDARY`]. For `"ab"` that is
/// `["\0\0a", "\0ab", "ab "]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Trigram(pub [char; 3]);

impl Trigram {
    /// Padding for window slots not yet filled at the start of a word.
    pub const PAD: char = '\0';

    /// Marker placed in the last slot after a word's final character.
    pub const BOUNDARY: char = ' ';

    /// Creates a trigram from three characters.
    #[inline(always)]
    pub const fn new(c0: char, c1: char, c2: char) -> Self {
        Self([c0, c1, c2])
    }

    /// Returns the window shifted left by one with `next` in the last slot.
    #[inline(always)]
    pub const fn shift(self, next: char) -> Self {
        Self([self.0[1], self.0[2], next])
    }

    /// Returns `true` if this gram closes a word.
    #[inline(always)]
    pub const fn is_boundary(self) -> bool {
        self.0[2] == Self::BOUNDARY
    }

    /// Returns the string key form, the three characters concatenated.
    pub fn key(self) -> String {
        self.0.iter().collect()
    }
}

impl fmt::Display for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0 {
            if c == Self::PAD {
                f.write_str("\\0")?;
            } else {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// A ranked search result: a food and its trigram overlap score.
///
/// Serialized as the food's fields followed by `score`.
///
/// Hits order by rank: higher score first, then ascending food id, so sorting
/// a `Vec<SearchHit>` ascending yields the response order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matched food.
    #[serde(flatten)]
    pub food: FoodRecord,
    /// Fraction of the query's trigrams found in the food's description.
    pub score: f64,
}

impl SearchHit {
    /// Creates a new hit.
    #[inline(always)]
    pub const fn new(food: FoodRecord, score: f64) -> Self {
        Self { food, score }
    }
}

impl PartialEq for SearchHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchHit {}

impl PartialOrd for SearchHit {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchHit {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.food.id.cmp(&other.food.id))
    }
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} score={:.3} {}",
            self.food.id, self.score, self.food.long_desc
        )
    }
}

/// Search configuration, fixed when an engine handle is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum trigram overlap ratio for a candidate to match (0.0-1.0].
    /// Default: [`DEFAULT_MIN_SIMILARITY`].
    pub min_similarity: f64,
    /// Maximum number of hits returned per query.
    /// Default: [`DEFAULT_MAX_RESULTS`].
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchConfig {
    /// Checks that the threshold lies in `(0, 1]` and the cap is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_similarity > 0.0 && self.min_similarity <= 1.0) {
            return Err(ConfigError::MinSimilarity(self.min_similarity));
        }
        if self.max_results == 0 {
            return Err(ConfigError::MaxResults);
        }
        Ok(())
    }

    /// Returns `true` if `score` clears the threshold. Equality counts.
    #[inline(always)]
    pub fn accepts(&self, score: f64) -> bool {
        score >= self.min_similarity
    }
}

/// Invalid [`SearchConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Threshold outside `(0, 1]`.
    #[error("min_similarity must be in (0, 1], got {0}")]
    MinSimilarity(f64),
    /// A zero result cap.
    #[error("max_results must be at least 1")]
    MaxResults,
}

/// Failure reported by a record store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing storage could not be read.
    #[error("store read failed: {reason}")]
    Read {
        /// What went wrong.
        reason: String,
    },
}

/// Errors returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// No index has been published yet.
    #[error("search index has not been built")]
    IndexNotBuilt,
    /// A store lookup failed; the whole query is aborted.
    #[error(transparent)]
    StoreReadFailed(#[from] StoreError),
    /// A posting references a record the store does not hold.
    #[error("posting references missing record ordinal {doc_id}")]
    InconsistentIndex {
        /// The dangling ordinal.
        doc_id: DocId,
    },
    /// A catalog lookup on the published index failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors that abort an index build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two records share an id.
    #[error("duplicate food id {id:?}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },
    /// More records than [`DocId`] can address.
    #[error("too many records: {count}")]
    TooManyRecords {
        /// Number of records offered.
        count: usize,
    },
}

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A nutrient value names a definition that was never loaded.
    #[error("food {food_id} references unknown nutrient {nutrient_id}")]
    MissingNutrientDef {
        /// Food the value belongs to.
        food_id: String,
        /// The unknown definition id.
        nutrient_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f64) -> SearchHit {
        SearchHit::new(FoodRecord::new(id, "0100", "desc", "DESC"), score)
    }

    #[test]
    fn search_hit_ordering() {
        let h1 = hit("1", 0.9);
        let h2 = hit("2", 0.75);
        let h3 = hit("3", 0.9);

        assert!(h1 < h2); // Higher score ranks first
        assert_ne!(h1, h3);
        assert_eq!(h1.cmp(&h3), Ordering::Less); // id breaks the tie

        let mut hits = vec![h2.clone(), h3.clone(), h1.clone()];
        hits.sort();
        let ids: Vec<&str> = hits.iter().map(|h| h.food.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "2"]);
    }

    #[test]
    fn trigram_shift_and_key() {
        let t = Trigram::new(Trigram::PAD, Trigram::PAD, 'a');
        let t = t.shift('b');
        assert_eq!(t, Trigram::new(Trigram::PAD, 'a', 'b'));
        assert_eq!(t.key(), "\0ab");

        let end = t.shift(Trigram::BOUNDARY);
        assert!(end.is_boundary());
        assert_eq!(end.key(), "ab ");
    }

    #[test]
    fn trigram_display_escapes_padding() {
        let t = Trigram::new(Trigram::PAD, 'c', 'h');
        assert_eq!(t.to_string(), "\\0ch");
    }

    #[test]
    fn config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.min_similarity, 0.70);
        assert_eq!(config.max_results, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_threshold_is_inclusive() {
        let config = SearchConfig::default();
        assert!(config.accepts(7.0 / 10.0));
        assert!(config.accepts(1.0));
        assert!(!config.accepts(0.6999));
        assert!(!config.accepts(69.0 / 100.0));
    }

    #[test]
    fn config_rejects_bad_values() {
        let zero = SearchConfig {
            min_similarity: 0.0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::MinSimilarity(0.0)));

        let above = SearchConfig {
            min_similarity: 1.5,
            ..Default::default()
        };
        assert!(above.validate().is_err());

        let nan = SearchConfig {
            min_similarity: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let no_cap = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        assert_eq!(no_cap.validate(), Err(ConfigError::MaxResults));
    }

    #[test]
    fn hit_serializes_flat() {
        let json = serde_json::to_value(hit("01009", 1.0)).unwrap();
        assert_eq!(json["id"], "01009");
        assert_eq!(json["long_desc"], "desc");
        assert_eq!(json["score"], 1.0);
        assert!(json.get("food").is_none());
    }

    #[test]
    fn search_error_from_store_error() {
        let err: SearchError = StoreError::Read {
            reason: "disk gone".into(),
        }
        .into();
        assert!(matches!(err, SearchError::StoreReadFailed(_)));
        assert_eq!(err.to_string(), "store read failed: disk gone");
    }
}
