//! Trigram search over USDA food descriptions.
//!
//! Load an SR release with [`loader::Dataset`], build a [`FoodIndex`] from
//! it, and publish the index through a [`SearchHandle`]:
//!
//! ```no_run
//! use grub_core::{loader::Dataset, SearchHandle};
//! use grub_types::SearchConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let index = Dataset::load_dir("data/sr28")?.into_index()?;
//! let handle = SearchHandle::with_index(SearchConfig::default(), index)?;
//! for hit in handle.search("cheddar cheese")? {
//!     println!("{hit}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod handle;
pub mod index;
pub mod loader;
pub mod store;

pub use handle::SearchHandle;
pub use index::{FoodIndex, IndexBuilder, IndexStats, QueryEngine, SnapshotError};
pub use loader::{Dataset, LoadError};
pub use store::{Catalog, RecordStore};
