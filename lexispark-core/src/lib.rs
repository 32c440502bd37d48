//! LexiSpark Core - word verification definitions
//!
//! This crate provides the pure pieces shared by the offline catalog builder,
//! the puzzle server and every client: text normalization, the Bloom filter
//! and its wire format, and the deterministic daily selector. Nothing here
//! performs I/O.

pub mod bloom_filter;
pub mod daily;
pub mod error;
pub mod format;
pub mod normalize;
pub mod traits;
pub mod validation;

pub use bloom_filter::BloomFilter;
pub use daily::{seed_hash, DailySeed};
pub use error::*;
pub use format::constants::DEFAULT_FALSE_POSITIVE_RATE;
pub use format::{BlobHash, BlobHeader};
pub use normalize::{dedup_normalized, is_dictionary_word, normalize};
pub use traits::*;
pub use validation::{parse_category_id, validate_label, PuzzleRef};
