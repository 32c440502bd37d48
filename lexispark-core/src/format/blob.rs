//! Serialized Bloom filter layout
//!
//! ```text
//! offset  size            field
//! 0       4               m, bit count (i32, little-endian)
//! 4       4               k, hash count (i32, little-endian)
//! 8       4 * ceil(m/32)  bit array words (i32, little-endian)
//! ```
//!
//! The layout is the contract between the offline builder and clients, so
//! encoding followed by decoding must reproduce the input byte for byte.

use super::constants::{HEADER_SIZE, WORD_SIZE};
use crate::bloom_filter::BloomFilter;
use crate::validation::bounds::validate_word_payload;
use crate::{LexisError, Result};
use sha2::{Digest, Sha256};

/// Fixed `m`/`k` prefix of a serialized filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    /// Bit-array size `m`
    pub bit_count: i32,
    /// Hash-function count `k`
    pub hash_count: i32,
}

impl BlobHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Parse the header from the start of a blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(LexisError::BufferTooShort);
        }

        let bit_count = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let hash_count = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        Ok(Self {
            bit_count,
            hash_count,
        })
    }

    /// Convert header to bytes
    pub const fn to_bytes_array(&self) -> [u8; Self::SIZE] {
        let m = self.bit_count.to_le_bytes();
        let k = self.hash_count.to_le_bytes();
        [m[0], m[1], m[2], m[3], k[0], k[1], k[2], k[3]]
    }

    /// Reject non-positive parameters
    pub const fn validate(&self) -> Result<()> {
        if self.bit_count <= 0 {
            return Err(LexisError::NonPositiveBitCount);
        }
        if self.hash_count <= 0 {
            return Err(LexisError::NonPositiveHashCount);
        }
        Ok(())
    }
}

impl BloomFilter {
    /// Serialized size in bytes
    pub fn serialized_size(&self) -> usize {
        BlobHeader::SIZE + self.words().len() * WORD_SIZE
    }

    /// Serialize to the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = BlobHeader {
            bit_count: self.bit_count() as i32,
            hash_count: self.hash_count() as i32,
        };

        let mut buffer = Vec::with_capacity(self.serialized_size());
        buffer.extend_from_slice(&header.to_bytes_array());
        if cfg!(target_endian = "little") {
            buffer.extend_from_slice(bytemuck::cast_slice(self.words()));
        } else {
            for word in self.words() {
                buffer.extend_from_slice(&word.to_le_bytes());
            }
        }
        buffer
    }

    /// Deserialize from the wire layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = BlobHeader::from_bytes(bytes)?;
        header.validate()?;

        let payload = &bytes[BlobHeader::SIZE..];
        validate_word_payload(payload.len(), header.bit_count as u32)?;

        let words = payload
            .chunks_exact(WORD_SIZE)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        BloomFilter::from_parts(header.bit_count as u32, header.hash_count as u32, words)
    }

    /// Content hash of the serialized form
    pub fn content_hash(&self) -> BlobHash {
        BlobHash::of(&self.to_bytes())
    }
}

/// SHA-256 of a serialized blob
///
/// Two blobs hash equal only when they are byte-identical, which lets a client
/// notice that saved progress was made against a different catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobHash([u8; 32]);

impl BlobHash {
    /// Hash raw blob bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(bytes));
        Self(digest)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl core::fmt::Display for BlobHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_bit_exact() {
        let mut filter = BloomFilter::with_parameters(40, 2).unwrap();
        filter.insert("cat");
        let bytes = filter.to_bytes();

        assert_eq!(bytes.len(), 8 + 2 * 4);
        assert_eq!(&bytes[0..4], &40i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &filter.words()[0].to_le_bytes());
        assert_eq!(&bytes[12..16], &filter.words()[1].to_le_bytes());
    }

    #[test]
    fn test_round_trip_byte_for_byte() {
        let filter = BloomFilter::from_words(["cat", "dog", "bird", "fish", "émeu"], 0.01).unwrap();
        let bytes = filter.to_bytes();
        let decoded = BloomFilter::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, filter);
        assert_eq!(decoded.to_bytes(), bytes);
        assert!(decoded.contains("emeu"));
    }

    #[test]
    fn test_negative_word_values_survive() {
        // High bit set reads back as a negative i32 on the wire
        let words = vec![0x8000_0001, u32::MAX];
        let filter = BloomFilter::from_parts(64, 1, words).unwrap();
        let bytes = filter.to_bytes();
        assert_eq!(&bytes[12..16], &(-1i32).to_le_bytes());
        assert_eq!(BloomFilter::from_bytes(&bytes).unwrap(), filter);
    }

    #[test]
    fn test_rejects_malformed_blobs() {
        assert_eq!(BloomFilter::from_bytes(&[]), Err(LexisError::BufferTooShort));
        assert_eq!(
            BloomFilter::from_bytes(&[1, 0, 0, 0]),
            Err(LexisError::BufferTooShort)
        );

        let mut zero_m = BlobHeader {
            bit_count: 0,
            hash_count: 3,
        }
        .to_bytes_array()
        .to_vec();
        assert_eq!(
            BloomFilter::from_bytes(&zero_m),
            Err(LexisError::NonPositiveBitCount)
        );
        zero_m[0..4].copy_from_slice(&(-5i32).to_le_bytes());
        assert_eq!(
            BloomFilter::from_bytes(&zero_m),
            Err(LexisError::NonPositiveBitCount)
        );

        let zero_k = BlobHeader {
            bit_count: 32,
            hash_count: 0,
        }
        .to_bytes_array();
        assert_eq!(
            BloomFilter::from_bytes(&zero_k),
            Err(LexisError::NonPositiveHashCount)
        );

        let mut huge_k = BlobHeader {
            bit_count: 32,
            hash_count: i32::MAX,
        }
        .to_bytes_array()
        .to_vec();
        huge_k.extend_from_slice(&[0xff; 4]);
        assert_eq!(
            BloomFilter::from_bytes(&huge_k),
            Err(LexisError::HashCountTooLarge)
        );

        let filter = BloomFilter::with_parameters(64, 3).unwrap();
        let mut bytes = filter.to_bytes();
        bytes.pop();
        assert!(BloomFilter::from_bytes(&bytes).unwrap_err().is_format_error());
        bytes.extend_from_slice(&[0, 0, 0, 0, 0]);
        assert_eq!(
            BloomFilter::from_bytes(&bytes),
            Err(LexisError::WordCountMismatch {
                expected: 2,
                actual_bytes: 12
            })
        );
    }

    #[test]
    fn test_content_hash_tracks_bytes() {
        let a = BloomFilter::from_words(["cat", "dog"], 0.01).unwrap();
        let b = BloomFilter::from_words(["cat", "dog"], 0.01).unwrap();
        let c = BloomFilter::from_words(["cat", "cow"], 0.01).unwrap();

        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert_eq!(a.content_hash().to_string().len(), 64);
        assert_eq!(a.content_hash(), BlobHash::of(&a.to_bytes()));
    }
}
