//! Trigram index over food descriptions.
//!
//! Memory layout:
//! - Records live in one `Vec`, addressed by their load ordinal ([`DocId`]).
//! - Posting lists are stored back to back in a single contiguous array.
//! - Each distinct trigram owns a [`PostingBlock`](types::PostingBlock)
//!   pointing into that array; blocks are sorted for binary search lookup.
//!
//! Threading:
//! - A built [`FoodIndex`] is immutable and `Send + Sync`. Searches allocate
//!   their own scratch space, so any number may run against one index.

mod api;
mod builder;
mod scoring;
mod search;
mod snapshot;
mod stats;
mod types;

pub use builder::IndexBuilder;
pub use search::QueryEngine;
pub use snapshot::SnapshotError;
pub use stats::IndexStats;
pub use types::FoodIndex;
