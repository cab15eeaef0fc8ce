//! Core domain primitives
//!
//! Foundational types, fixed-point arithmetic, and error definitions shared
//! by every layer of the indexer. Independent of storage and transport
//! concerns.

pub mod error;
pub mod numeric;
pub mod types;

// Re-export commonly used items
pub use error::{IndexerError, IndexerResult, StorageError};
pub use numeric::Wad;
pub use types::{Address, DailySeries, SeriesId, SeriesKind};
