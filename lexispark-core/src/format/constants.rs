//! Format constants for the Bloom filter blob

/// Size of the `m`/`k` prefix in bytes
pub const HEADER_SIZE: usize = 8;

/// Size of one packed bit-array word in bytes
pub const WORD_SIZE: usize = 4;

/// Bits carried by one packed word
pub const BITS_PER_WORD: usize = 32;

/// Upper bound on `k`; a decoded filter asking for more is rejected
pub const MAX_HASH_COUNT: u32 = 256;

/// False-positive rate used when the builder is not told otherwise
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;
