//! Error types for LexiSpark core operations

/// Errors that can occur in the verification core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexisError {
    /// Blob is shorter than the fixed `m`/`k` prefix
    BufferTooShort,
    /// Bit-array size `m` is zero or negative
    NonPositiveBitCount,
    /// Hash-function count `k` is zero or negative
    NonPositiveHashCount,
    /// Hash-function count `k` exceeds the bit count or the supported maximum
    HashCountTooLarge,
    /// Payload does not hold exactly `ceil(m/32)` words
    WordCountMismatch { expected: usize, actual_bytes: usize },
    /// False-positive rate outside the open interval (0, 1)
    InvalidFalsePositiveRate,
    /// Computed bit-array size does not fit the 32-bit wire field
    FilterTooLarge,
    /// Nothing to select from
    NoCandidates,
    /// Puzzle identifier is neither a special name nor an integer id
    InvalidCategoryId,
    /// Selection label is empty or contains control characters
    InvalidLabel,
}

impl LexisError {
    /// Whether this error means a received blob cannot be trusted
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            LexisError::BufferTooShort
                | LexisError::NonPositiveBitCount
                | LexisError::NonPositiveHashCount
                | LexisError::HashCountTooLarge
                | LexisError::WordCountMismatch { .. }
        )
    }
}

impl core::fmt::Display for LexisError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LexisError::BufferTooShort => write!(f, "Bloom filter blob too short"),
            LexisError::NonPositiveBitCount => write!(f, "Bloom filter bit count must be positive"),
            LexisError::NonPositiveHashCount => {
                write!(f, "Bloom filter hash count must be positive")
            }
            LexisError::HashCountTooLarge => write!(f, "Bloom filter hash count too large"),
            LexisError::WordCountMismatch {
                expected,
                actual_bytes,
            } => write!(
                f,
                "Bloom filter payload holds {actual_bytes} bytes, expected {expected} words"
            ),
            LexisError::InvalidFalsePositiveRate => {
                write!(f, "False positive rate must be between 0 and 1")
            }
            LexisError::FilterTooLarge => write!(f, "Bloom filter too large for wire format"),
            LexisError::NoCandidates => write!(f, "No valid categories found for this language"),
            LexisError::InvalidCategoryId => write!(f, "Invalid category ID format"),
            LexisError::InvalidLabel => write!(f, "Invalid selection label"),
        }
    }
}

impl std::error::Error for LexisError {}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, LexisError>;
