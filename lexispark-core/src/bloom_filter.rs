//! Word-membership Bloom filter
//!
//! The filter is sized from the corpus with the textbook formulas
//! `m = ceil(-n ln p / (ln 2)^2)` and `k = round((m / n) ln 2)`, and stores its
//! `m` bits packed into 32-bit words so the wire layout in
//! [`crate::format`] is a straight copy of the backing array.

use crate::format::constants::{BITS_PER_WORD, MAX_HASH_COUNT};
use crate::normalize::normalize;
use crate::validation::bounds::word_count_for_bits;
use crate::{LexisError, Result};

/// Bloom filter over normalized words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Number of addressable bits (`m`)
    bit_count: u32,
    /// Number of bit positions derived per word (`k`)
    hash_count: u32,
    /// Bit array, `ceil(m / 32)` words, bit `i` lives in `words[i / 32]`
    words: Vec<u32>,
}

impl BloomFilter {
    /// Compute `(m, k)` for `expected_elements` words at false-positive rate `p`.
    ///
    /// An empty corpus is sized as a single element so the result is still a
    /// valid, decodable filter. `k` never drops below one.
    pub fn optimal_parameters(expected_elements: usize, p: f64) -> Result<(u32, u32)> {
        if !(p > 0.0 && p < 1.0) {
            return Err(LexisError::InvalidFalsePositiveRate);
        }

        let n = expected_elements.max(1) as f64;
        let ln2 = core::f64::consts::LN_2;
        let m = (-(n * p.ln()) / (ln2 * ln2)).ceil();
        if m > i32::MAX as f64 {
            return Err(LexisError::FilterTooLarge);
        }
        let m = (m as u32).max(1);
        let k = ((m as f64 / n) * ln2).round().max(1.0) as u32;
        if k > MAX_HASH_COUNT {
            return Err(LexisError::HashCountTooLarge);
        }

        Ok((m, k))
    }

    /// Create an empty filter sized for `expected_elements` at rate `p`
    pub fn new(expected_elements: usize, p: f64) -> Result<Self> {
        let (bit_count, hash_count) = Self::optimal_parameters(expected_elements, p)?;
        Self::with_parameters(bit_count, hash_count)
    }

    /// Create an empty filter with explicit `m` and `k`
    pub fn with_parameters(bit_count: u32, hash_count: u32) -> Result<Self> {
        if bit_count == 0 || bit_count > i32::MAX as u32 {
            return Err(LexisError::NonPositiveBitCount);
        }
        if hash_count == 0 {
            return Err(LexisError::NonPositiveHashCount);
        }
        if hash_count > MAX_HASH_COUNT || hash_count > bit_count {
            return Err(LexisError::HashCountTooLarge);
        }

        Ok(Self {
            bit_count,
            hash_count,
            words: vec![0; word_count_for_bits(bit_count)],
        })
    }

    /// Build a filter from raw corpus words, normalizing each one.
    pub fn from_words<I, S>(words: I, p: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = words.into_iter().map(|w| normalize(w.as_ref())).collect();
        let mut filter = Self::new(normalized.len(), p)?;
        for word in &normalized {
            filter.insert(word);
        }
        Ok(filter)
    }

    /// Rebuild a filter from decoded parts
    ///
    /// The word array must already hold exactly `ceil(m / 32)` entries.
    pub fn from_parts(bit_count: u32, hash_count: u32, words: Vec<u32>) -> Result<Self> {
        let mut filter = Self::with_parameters(bit_count, hash_count)?;
        if words.len() != filter.words.len() {
            return Err(LexisError::WordCountMismatch {
                expected: filter.words.len(),
                actual_bytes: words.len() * 4,
            });
        }
        filter.words = words;
        Ok(filter)
    }

    /// Insert an already-normalized word
    pub fn insert(&mut self, word: &str) {
        for bit in self.positions(word) {
            self.words[bit / BITS_PER_WORD] |= 1 << (bit % BITS_PER_WORD);
        }
    }

    /// Check if an already-normalized word might be in the set
    pub fn contains(&self, word: &str) -> bool {
        self.positions(word)
            .all(|bit| self.words[bit / BITS_PER_WORD] & (1 << (bit % BITS_PER_WORD)) != 0)
    }

    /// Normalize `raw` and test it
    pub fn check_word(&self, raw: &str) -> bool {
        self.contains(&normalize(raw))
    }

    /// Number of addressable bits (`m`)
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Number of hash functions (`k`)
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Packed bit array (for serialization)
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Fraction of bits currently set
    pub fn fill_ratio(&self) -> f64 {
        let set: u32 = self.words.iter().map(|w| w.count_ones()).sum();
        set as f64 / self.bit_count as f64
    }

    /// False-positive rate implied by the realized fill ratio
    pub fn estimated_false_positive_rate(&self) -> f64 {
        self.fill_ratio().powi(self.hash_count as i32)
    }

    /// Bit positions for a word via double hashing: `h1 + i * h2 (mod m)`.
    fn positions(&self, word: &str) -> impl Iterator<Item = usize> {
        let h1 = fnv1a(word.as_bytes()) as u64;
        let h2 = (fmix32(h1 as u32) | 1) as u64;
        let m = self.bit_count as u64;
        let k = self.hash_count as u64;
        (0..k).map(move |i| ((h1 + i * h2) % m) as usize)
    }
}

/// 32-bit FNV-1a
fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = 2166136261u32; // FNV offset basis
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619); // FNV prime
    }
    hash
}

/// MurmurHash3 finalizer, decorrelates the second hash from the first
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
