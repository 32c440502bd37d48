//! Payload size validation for the Bloom filter blob
//!
//! Pure arithmetic on lengths, no I/O.

use crate::format::constants::{BITS_PER_WORD, WORD_SIZE};
use crate::{LexisError, Result};

/// Number of packed words needed for `bit_count` bits
pub const fn word_count_for_bits(bit_count: u32) -> usize {
    (bit_count as usize).div_ceil(BITS_PER_WORD)
}

/// Validate that a payload of `byte_len` bytes holds exactly the words an
/// `bit_count`-bit array needs.
///
/// Returns the word count on success.
pub const fn validate_word_payload(byte_len: usize, bit_count: u32) -> Result<usize> {
    let expected = word_count_for_bits(bit_count);

    if byte_len % WORD_SIZE != 0 || byte_len / WORD_SIZE != expected {
        return Err(LexisError::WordCountMismatch {
            expected,
            actual_bytes: byte_len,
        });
    }

    Ok(expected)
}
