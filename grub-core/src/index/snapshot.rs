//! On-disk snapshots of a built index.
//!
//! Layout: a 4-byte magic tag, a little-endian `u32` format version, then the
//! bincode encoding of the records, posting blocks, postings and catalog.
//! Loading a snapshot skips USDA parsing and trigram extraction entirely.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use grub_types::{BuildError, DocId, FoodRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::index::types::{FoodIndex, PostingBlock};
use crate::store::Catalog;

const MAGIC: [u8; 4] = *b"GRUB";
const FORMAT_VERSION: u32 = 1;

/// Errors reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot i/o: {0}")]
    Io(#[from] io::Error),
    /// The body could not be encoded or decoded.
    #[error("snapshot encoding: {0}")]
    Encoding(#[from] bincode::Error),
    /// The file is not a snapshot, or one written by a different format version.
    #[error("incompatible snapshot (magic {magic:?}, version {version})")]
    Incompatible {
        /// Tag found in the file.
        magic: [u8; 4],
        /// Version found in the file.
        version: u32,
    },
    /// The body decoded but does not describe a valid index.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
    /// The stored records violate a build invariant.
    #[error(transparent)]
    Build(#[from] BuildError),
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    records: &'a [FoodRecord],
    blocks: &'a [PostingBlock],
    postings: &'a [DocId],
    catalog: &'a Catalog,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    records: Vec<FoodRecord>,
    blocks: Vec<PostingBlock>,
    postings: Vec<DocId>,
    catalog: Catalog,
}

impl FoodIndex {
    /// Writes the index to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] on I/O or encoding failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write_snapshot(&mut out)?;
        out.flush()?;
        info!(path = %path.display(), records = self.len(), "snapshot saved");
        Ok(())
    }

    /// Reads an index previously written by [`FoodIndex::save`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Incompatible`] for a foreign or outdated
    /// file and [`SnapshotError::Corrupt`] if posting blocks are out of
    /// bounds, unsorted, or reference missing records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let index = Self::read_snapshot(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), records = index.len(), "snapshot loaded");
        Ok(index)
    }

    /// Writes the snapshot encoding to any writer.
    pub fn write_snapshot<W: Write>(&self, mut out: W) -> Result<(), SnapshotError> {
        out.write_all(&MAGIC)?;
        out.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::serialize_into(
            out,
            &SnapshotRef {
                records: &self.records,
                blocks: &self.blocks,
                postings: &self.postings,
                catalog: &self.catalog,
            },
        )?;
        Ok(())
    }

    /// Reads the snapshot encoding from any reader.
    pub fn read_snapshot<R: Read>(mut input: R) -> Result<Self, SnapshotError> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        let mut version = [0u8; 4];
        input.read_exact(&mut version)?;
        let version = u32::from_le_bytes(version);
        if magic != MAGIC || version != FORMAT_VERSION {
            return Err(SnapshotError::Incompatible { magic, version });
        }

        let body: SnapshotOwned = bincode::deserialize_from(input)?;
        validate_blocks(&body.blocks, &body.postings, body.records.len())?;
        let ids = Self::id_map(&body.records)?;

        Ok(Self {
            records: body.records,
            ids,
            blocks: body.blocks,
            postings: body.postings,
            catalog: body.catalog,
        })
    }
}

fn validate_blocks(
    blocks: &[PostingBlock],
    postings: &[DocId],
    record_count: usize,
) -> Result<(), SnapshotError> {
    if blocks.windows(2).any(|w| w[0].trigram >= w[1].trigram) {
        return Err(SnapshotError::Corrupt("posting blocks not sorted".into()));
    }
    for block in blocks {
        let end = block.offset as usize + block.len as usize;
        if end > postings.len() {
            return Err(SnapshotError::Corrupt(format!(
                "block {} overruns postings ({end} > {})",
                block.trigram,
                postings.len()
            )));
        }
        let slice = FoodIndex::block_postings(block, postings);
        if slice.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SnapshotError::Corrupt(format!(
                "postings for block {} not strictly increasing",
                block.trigram
            )));
        }
    }
    if let Some(&doc_id) = postings.iter().find(|&&d| d as usize >= record_count) {
        return Err(SnapshotError::Corrupt(format!(
            "posting references ordinal {doc_id} of {record_count} records"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use grub_types::{NutrientDef, NutrientValue, Weight};

    fn sample() -> FoodIndex {
        IndexBuilder::new()
            .records([
                FoodRecord::new("1", "0100", "cheddar cheese block", "CHEDDAR"),
                FoodRecord::new("2", "0100", "cheese spread", "SPREAD"),
                FoodRecord::new("3", "1800", "apple pie", "PIE"),
            ])
            .weights([Weight {
                food_id: "1".into(),
                seq: "1".into(),
                amount: Some(1.0),
                description: "cup, diced".into(),
                grams: Some(132.0),
                data_points: None,
                std_dev: None,
            }])
            .nutrients(
                [NutrientDef {
                    id: "203".into(),
                    units: "g".into(),
                    tag_name: "PROCNT".into(),
                    description: "Protein".into(),
                    decimals: "2".into(),
                    sort: Some(600.0),
                }],
                [NutrientValue {
                    food_id: "1".into(),
                    nutrient_id: "203".into(),
                    value: Some(24.9),
                    data_points: Some(14.0),
                    std_error: None,
                }],
            )
            .build()
            .unwrap()
    }

    fn ids(index: &FoodIndex, query: &str) -> Vec<String> {
        index
            .search(query)
            .unwrap()
            .into_iter()
            .map(|h| h.food.id)
            .collect()
    }

    #[test]
    fn save_and_load_preserve_search() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foods.grub");

        let original = sample();
        original.save(&path).unwrap();
        let loaded = FoodIndex::load(&path).unwrap();

        assert_eq!(loaded.stats(), original.stats());
        assert_eq!(ids(&loaded, "cheese"), ids(&original, "cheese"));
        assert_eq!(loaded.get("3"), original.get("3"));
        assert_eq!(loaded.catalog().weights("1").len(), 1);
        assert_eq!(loaded.catalog().nutrients("1").unwrap()[0].name, "Protein");
    }

    #[test]
    fn rejects_foreign_file() {
        let bytes = b"NOPE\x01\x00\x00\x00rest".to_vec();
        let err = FoodIndex::read_snapshot(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Incompatible { magic, version: 1 } if &magic == b"NOPE"
        ));
    }

    #[test]
    fn rejects_other_version() {
        let mut bytes = Vec::new();
        sample().write_snapshot(&mut bytes).unwrap();
        bytes[4] = 9;
        let err = FoodIndex::read_snapshot(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SnapshotError::Incompatible { version: 9, .. }));
    }

    #[test]
    fn truncated_file_is_an_error() {
        let mut bytes = Vec::new();
        sample().write_snapshot(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(FoodIndex::read_snapshot(bytes.as_slice()).is_err());
    }

    #[test]
    fn repeated_ordinal_in_block_is_corrupt() {
        let mut index = sample();
        let idx = index
            .blocks
            .iter()
            .position(|b| b.len >= 2)
            .unwrap();
        let offset = index.blocks[idx].offset as usize;
        index.postings[offset + 1] = index.postings[offset];
        let mut bytes = Vec::new();
        index.write_snapshot(&mut bytes).unwrap();

        let err = FoodIndex::read_snapshot(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(ref msg) if msg.contains("strictly")));
    }

    #[test]
    fn dangling_posting_is_corrupt() {
        let mut index = sample();
        index.records.pop();
        let mut bytes = Vec::new();
        index.write_snapshot(&mut bytes).unwrap();

        let err = FoodIndex::read_snapshot(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(_)));
    }
}
